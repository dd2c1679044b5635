use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tendra_core::{BusinessFunctionId, DocumentId, Entity, PersonId};

/// Legal identifier of an organization or person (registry scheme + id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub scheme: String,
    pub id: String,
    pub legal_name: String,
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    pub region: Option<String>,
    pub locality: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
}

/// Role a person performs for the procuring entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessFunctionType {
    Chairman,
    ProcurementOfficer,
    ContactPoint,
    TechnicalOpener,
}

/// Document attached to a business function (e.g. an appointment order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessFunctionDocument {
    pub id: DocumentId,
    pub document_type: String,
    pub title: String,
    pub description: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
}

impl Entity for BusinessFunctionDocument {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Business function: belongs to exactly one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessFunction {
    pub id: BusinessFunctionId,
    pub function: BusinessFunctionType,
    pub job_title: String,
    pub start_date: DateTime<Utc>,
    pub documents: Vec<BusinessFunctionDocument>,
}

impl Entity for BusinessFunction {
    type Id = BusinessFunctionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Person acting for the procuring entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub title: Option<String>,
    pub name: String,
    pub identifier: Option<Identifier>,
    pub business_functions: Vec<BusinessFunction>,
}

impl Entity for Person {
    type Id = PersonId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Person {
    /// Whether any of this person's business functions carries the given role.
    pub fn has_function(&self, function: BusinessFunctionType) -> bool {
        self.business_functions.iter().any(|bf| bf.function == function)
    }
}

/// The organization running the procurement, embedded in the tender aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcuringEntity {
    pub name: String,
    pub identifier: Identifier,
    pub address: Address,
    pub persons: Vec<Person>,
}

impl ProcuringEntity {
    pub fn contact_points(&self) -> impl Iterator<Item = &Person> {
        self.persons
            .iter()
            .filter(|p| p.has_function(BusinessFunctionType::ContactPoint))
    }
}
