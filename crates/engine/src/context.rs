//! Caller context for one reconciliation pass.
//!
//! Ownership and token authenticity are verified by an external
//! collaborator before the engine is invoked; the engine only threads the
//! values through for persistence and error reporting.

use chrono::{DateTime, Utc};

use tendra_core::{ProcessId, Stage};
use tendra_tender::TenderRef;

/// Identifies the aggregate being amended and carries the wall-clock
/// reference instant used for period validations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    pub process: ProcessId,
    pub stage: Stage,
    /// Source stage for create-from-previous-stage operations.
    pub previous_stage: Option<Stage>,
    pub owner: String,
    pub access_token: String,
    /// Reference instant: lot contract periods must start strictly after
    /// this (or after the tender period end, when one is present).
    pub start_date: DateTime<Utc>,
}

impl OperationContext {
    pub fn reference(&self) -> TenderRef {
        TenderRef::new(self.process.clone(), self.stage.clone())
    }

    pub fn previous_reference(&self) -> Option<TenderRef> {
        self.previous_stage
            .as_ref()
            .map(|stage| TenderRef::new(self.process.clone(), stage.clone()))
    }
}
