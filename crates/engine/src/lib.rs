//! `tendra-engine` — the aggregate reconciliation engine.
//!
//! Applies a caller-supplied revision to a persisted tender aggregate:
//! keyed collections are three-way merged, freshly introduced sub-entities
//! are promoted to permanent identifiers with every cross-reference
//! rewritten, the merged result is validated against a fixed battery of
//! cross-collection invariants, and the aggregate-level scalars are
//! re-derived before a single conditional write.

pub mod collections;
pub mod context;
pub mod continuity;
pub mod derive;
pub mod orchestrator;
pub mod reconcile;
pub mod rewrite;
pub mod store;
pub mod transition;
pub mod validate;

pub use collections::{
    AuctionMerge, BusinessFunctionDocumentMerge, BusinessFunctionMerge, DocumentMerge, ItemMerge,
    LotMerge, PersonMerge,
};
pub use context::OperationContext;
pub use continuity::IdContinuity;
pub use derive::{derive_contract_period, derive_value};
pub use orchestrator::UpdateOrchestrator;
pub use reconcile::{KeyedMerge, reconcile};
pub use rewrite::rewrite_revision;
pub use store::{DocumentStore, Snapshot};
pub use transition::{CollectionKind, OperationKind, OperationProfile};
pub use validate::{ValidationContext, validate_aggregate};
