use std::collections::HashMap;
use std::sync::RwLock;

use tendra_core::{DomainError, DomainResult, ExpectedVersion};
use tendra_engine::{DocumentStore, Snapshot};
use tendra_tender::{Tender, TenderRef};

#[derive(Debug, Clone)]
struct StoredDocument {
    version: u64,
    payload: serde_json::Value,
}

/// In-memory compare-and-swap document store.
///
/// Intended for tests/dev. Documents are held as JSON values the way a
/// real document store would hold them, so the deserialization-failure
/// (incident) path is exercised rather than bypassed.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<TenderRef, StoredDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document unconditionally (test setup).
    pub fn seed(&self, tender: &Tender, version: u64) -> DomainResult<()> {
        let payload = serde_json::to_value(tender)
            .map_err(|e| DomainError::incident(format!("serialization failed: {e}")))?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| DomainError::incident("document store lock poisoned"))?;
        documents.insert(tender.reference().clone(), StoredDocument { version, payload });
        Ok(())
    }

    /// Corrupt a stored payload (test helper for the incident path).
    pub fn corrupt(&self, reference: &TenderRef) -> DomainResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| DomainError::incident("document store lock poisoned"))?;
        if let Some(entry) = documents.get_mut(reference) {
            entry.payload = serde_json::Value::String("not a tender".to_string());
        }
        Ok(())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(&self, reference: &TenderRef) -> DomainResult<Option<Snapshot>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| DomainError::incident("document store lock poisoned"))?;
        let Some(entry) = documents.get(reference) else {
            return Ok(None);
        };
        let tender: Tender = serde_json::from_value(entry.payload.clone())
            .map_err(|e| DomainError::incident(format!("corrupt document {reference}: {e}")))?;
        Ok(Some(Snapshot {
            tender,
            version: entry.version,
        }))
    }

    fn save(&self, tender: &Tender, expected: ExpectedVersion) -> DomainResult<bool> {
        let payload = serde_json::to_value(tender)
            .map_err(|e| DomainError::incident(format!("serialization failed: {e}")))?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| DomainError::incident("document store lock poisoned"))?;

        let reference = tender.reference().clone();
        let current = documents.get(&reference).map(|e| e.version).unwrap_or(0);
        if !expected.matches(current) {
            tracing::debug!(%reference, current, ?expected, "conditional save lost");
            return Ok(false);
        }
        documents.insert(
            reference,
            StoredDocument {
                version: current + 1,
                payload,
            },
        );
        Ok(true)
    }
}
