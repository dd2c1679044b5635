//! Identifier-source capability.
//!
//! Permanent identifiers are never minted from process-wide state; the
//! reconciliation pass receives an [`IdSource`] instance so the pass stays
//! deterministic under test with a sequenced fake.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Capability for minting identifiers.
pub trait IdSource {
    /// A new permanent, UUID-shaped identifier.
    fn permanent_id(&self) -> String;

    /// A new timestamp-ordered identifier (sortable by creation time).
    fn timestamp_ordered_id(&self) -> String;
}

/// Production source backed by the `uuid` crate.
///
/// Permanent ids are random v4; timestamp-ordered ids are v7.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl UuidSource {
    pub fn new() -> Self {
        Self
    }
}

impl IdSource for UuidSource {
    fn permanent_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn timestamp_ordered_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Deterministic source for tests/dev: `perm-1`, `perm-2`, ...
#[derive(Debug, Default)]
pub struct SequencedIdSource {
    counter: AtomicU64,
}

impl SequencedIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl IdSource for SequencedIdSource {
    fn permanent_id(&self) -> String {
        format!("perm-{}", self.next())
    }

    fn timestamp_ordered_id(&self) -> String {
        format!("ts-{}", self.next())
    }
}
