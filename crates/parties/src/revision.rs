//! Revision shapes for the procuring-entity branch of the aggregate.
//!
//! Revisions are transient intent: absent (`None`) fields default to the
//! stored value during reconciliation, present fields replace it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tendra_core::{BusinessFunctionId, DocumentId, PersonId};

use crate::party::{BusinessFunctionType, Identifier};

/// Partial update of a business-function document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessFunctionDocumentRevision {
    pub id: DocumentId,
    pub document_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Partial update of a business function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessFunctionRevision {
    pub id: BusinessFunctionId,
    pub function: Option<BusinessFunctionType>,
    pub job_title: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub documents: Vec<BusinessFunctionDocumentRevision>,
}

/// Partial update of a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRevision {
    pub id: PersonId,
    pub title: Option<String>,
    pub name: Option<String>,
    pub identifier: Option<Identifier>,
    pub business_functions: Vec<BusinessFunctionRevision>,
}

/// Partial update of the procuring entity; only persons are keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcuringEntityRevision {
    pub name: Option<String>,
    pub persons: Vec<PersonRevision>,
}
