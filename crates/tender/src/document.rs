use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tendra_core::{DocumentId, Entity, LotId};

/// Kind of tender-level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    TenderNotice,
    BiddingDocuments,
    TechnicalSpecifications,
    EvaluationCriteria,
    ClarificationDocument,
    Illustration,
}

/// Document attached to the tender, optionally scoped to specific lots.
///
/// The caller supplies the id; it is stable from first submission. On
/// update, `related_lots` is unioned with the prior value, never replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub document_type: DocumentType,
    pub title: String,
    pub description: Option<String>,
    pub related_lots: BTreeSet<LotId>,
    pub date_published: Option<DateTime<Utc>>,
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
