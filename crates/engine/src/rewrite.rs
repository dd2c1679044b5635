//! Cross-reference rewriting.
//!
//! Runs after lots are reconciled and before items, documents and auction
//! details are: every lot reference in the revision payload that matches a
//! just-promoted temporary key is replaced by its permanent id. Lookup
//! misses pass through unchanged, which makes the rewrite idempotent —
//! permanent ids of already-existing lots are never in the map.

use std::collections::HashMap;

use tendra_core::LotId;
use tendra_tender::TenderRevision;

/// Apply the temporary-to-permanent lot-id mapping to every lot reference
/// in the revision.
pub fn rewrite_revision(revision: &mut TenderRevision, mapping: &HashMap<String, String>) {
    if mapping.is_empty() {
        return;
    }

    for item in &mut revision.items {
        if let Some(related) = &mut item.related_lot {
            rewrite_lot_ref(related, mapping);
        }
    }
    for document in &mut revision.documents {
        for related in &mut document.related_lots {
            rewrite_lot_ref(related, mapping);
        }
    }
    for detail in &mut revision.auction_details {
        rewrite_lot_ref(&mut detail.related_lot, mapping);
    }
}

fn rewrite_lot_ref(reference: &mut LotId, mapping: &HashMap<String, String>) {
    if let Some(permanent) = mapping.get(reference.as_str()) {
        *reference = LotId::new(permanent.clone());
    }
}
