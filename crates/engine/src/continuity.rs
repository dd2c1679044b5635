//! ID continuity: promotion of temporary keys to permanent identifiers.
//!
//! One instance lives for one reconciliation pass and one collection. The
//! mapping it accumulates is handed to the cross-reference rewriter and
//! then discarded; it is never persisted.

use std::collections::HashMap;

use tendra_core::IdSource;

/// Mints a permanent identifier at most once per temporary key.
///
/// Keys of entities that already carry a permanent id never enter the map:
/// the reconciler only resolves keys it classified as new.
pub struct IdContinuity<'a> {
    ids: &'a dyn IdSource,
    map: HashMap<String, String>,
}

impl<'a> IdContinuity<'a> {
    pub fn new(ids: &'a dyn IdSource) -> Self {
        Self {
            ids,
            map: HashMap::new(),
        }
    }

    /// The permanent id for a temporary key, minting on first sight.
    pub fn resolve(&mut self, temporary: &str) -> String {
        let ids = self.ids;
        self.map
            .entry(temporary.to_string())
            .or_insert_with(|| ids.permanent_id())
            .clone()
    }

    /// The temporary-to-permanent mapping accumulated so far.
    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.map
    }

    /// How many permanent ids this pass has minted.
    pub fn minted(&self) -> usize {
        self.map.len()
    }
}
