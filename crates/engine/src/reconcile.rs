//! Generic three-way merge over keyed sub-collections.
//!
//! One `reconcile` call processes one collection of one revision:
//! received keys are partitioned against stored keys into matched
//! (update), new (create) and missing (policy-dependent retention). The
//! collection-specific policies live in the [`KeyedMerge`] implementation,
//! not here.

use std::collections::{HashMap, HashSet};

use tendra_core::{DomainError, DomainResult};

/// Collection-specific merge policy.
///
/// `update`/`create` take `&mut self` so a policy can carry pass-scoped
/// state, e.g. the ID continuity manager minting permanent ids for new
/// keys.
pub trait KeyedMerge {
    type Received;
    type Stored;

    /// Collection name used in error reporting ("lots", "documents", ...).
    fn label(&self) -> &'static str;

    fn received_key(&self, received: &Self::Received) -> String;

    fn stored_key(&self, stored: &Self::Stored) -> String;

    /// Field-level merge of a matched pair. Absent revision fields default
    /// to the stored value.
    fn update(&mut self, stored: &Self::Stored, received: &Self::Received)
    -> DomainResult<Self::Stored>;

    /// Construct a new entity from a received-only key.
    fn create(&mut self, received: &Self::Received) -> DomainResult<Self::Stored>;

    /// Policy for a stored entity absent from the revision: keep it (as-is
    /// or with a terminal status forced), or drop it (`None`).
    fn missing(&mut self, stored: &Self::Stored) -> DomainResult<Option<Self::Stored>>;

    /// Whether an empty revision list against a non-empty stored collection
    /// fails the pass instead of falling through to `missing`.
    fn rejects_empty(&self) -> bool {
        false
    }
}

/// Merge `received` into `stored` under the policy `merge`.
///
/// Result order: updated entities in stored order, then
/// missing-but-retained entities in stored order, then created entities in
/// received order. The order carries no semantics beyond being stable.
pub fn reconcile<M: KeyedMerge>(
    merge: &mut M,
    stored: &[M::Stored],
    received: &[M::Received],
) -> DomainResult<Vec<M::Stored>> {
    let mut received_by_key: HashMap<String, &M::Received> = HashMap::new();
    for entry in received {
        let key = merge.received_key(entry);
        if received_by_key.insert(key.clone(), entry).is_some() {
            return Err(DomainError::duplicate_id(merge.label(), key));
        }
    }

    if received.is_empty() && !stored.is_empty() && merge.rejects_empty() {
        return Err(DomainError::MissingRequiredCollection {
            collection: merge.label(),
        });
    }

    let stored_keys: HashSet<String> = stored.iter().map(|entry| merge.stored_key(entry)).collect();

    let mut updated = Vec::new();
    let mut retained = Vec::new();
    for entry in stored {
        let key = merge.stored_key(entry);
        match received_by_key.get(&key) {
            Some(&matching) => updated.push(merge.update(entry, matching)?),
            None => {
                if let Some(kept) = merge.missing(entry)? {
                    retained.push(kept);
                }
            }
        }
    }

    let mut result = updated;
    result.append(&mut retained);

    for entry in received {
        if !stored_keys.contains(&merge.received_key(entry)) {
            result.push(merge.create(entry)?);
        }
    }

    Ok(result)
}
