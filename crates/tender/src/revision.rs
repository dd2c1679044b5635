//! Revision shapes: the caller-supplied partial update of a tender.
//!
//! A revision is transient intent; it is reconciled against the stored
//! aggregate and discarded. Absent (`None`) fields default to the stored
//! value; keyed sub-collections are three-way merged. Lot and item ids may
//! be caller-chosen temporary keys, valid only within this revision.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tendra_core::{DocumentId, ItemId, LotId, Money, Period};
use tendra_parties::ProcuringEntityRevision;

use crate::document::DocumentType;
use crate::item::{Classification, Unit};
use crate::lot::PlaceOfPerformance;

/// Partial update of a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotRevision {
    pub id: LotId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub value: Option<Money>,
    pub contract_period: Option<Period>,
    pub place_of_performance: Option<PlaceOfPerformance>,
}

/// Partial update of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRevision {
    pub id: ItemId,
    pub description: Option<String>,
    pub classification: Option<Classification>,
    pub quantity: Option<Decimal>,
    pub unit: Option<Unit>,
    pub related_lot: Option<LotId>,
}

/// Partial update of a document. `related_lots` is unioned into the stored
/// set, never replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRevision {
    pub id: DocumentId,
    pub document_type: Option<DocumentType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub related_lots: Vec<LotId>,
}

/// Partial update of one lot's auction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionDetailRevision {
    pub related_lot: LotId,
    pub start_date: Option<DateTime<Utc>>,
    pub bid_step: Option<Money>,
}

/// The full revision payload for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderRevision {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tender_period: Option<Period>,
    pub lots: Vec<LotRevision>,
    pub items: Vec<ItemRevision>,
    pub documents: Vec<DocumentRevision>,
    pub auction_details: Vec<AuctionDetailRevision>,
    pub procuring_entity: Option<ProcuringEntityRevision>,
}

impl TenderRevision {
    /// Whether the revision touches anything beyond top-level fields.
    pub fn has_collection_changes(&self) -> bool {
        !self.lots.is_empty()
            || !self.items.is_empty()
            || !self.documents.is_empty()
            || !self.auction_details.is_empty()
            || self.procuring_entity.is_some()
    }
}
