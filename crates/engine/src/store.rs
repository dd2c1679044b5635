//! Storage collaborator contract.
//!
//! The engine performs no IO itself; the orchestrator loads a snapshot,
//! runs the pass, and writes conditionally on the snapshot's version
//! marker. A `false` from `save` means the compare-and-swap lost.

use tendra_core::{DomainResult, ExpectedVersion};
use tendra_tender::{Tender, TenderRef};

/// One loaded aggregate plus the opaque version marker to write against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tender: Tender,
    pub version: u64,
}

/// Key-value document store, one tender per process stage.
pub trait DocumentStore {
    fn get(&self, reference: &TenderRef) -> DomainResult<Option<Snapshot>>;

    /// Conditional write; `Ok(false)` reports a lost compare-and-swap.
    fn save(&self, tender: &Tender, expected: ExpectedVersion) -> DomainResult<bool>;
}
