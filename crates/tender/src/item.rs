use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tendra_core::{Entity, ItemId, LotId};

/// Classification of what is being procured (scheme + code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub scheme: String,
    pub id: String,
    pub description: String,
}

/// Unit of measure for an item quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub code: String,
    pub name: String,
}

/// Item: a line of the lot it relates to.
///
/// Removal is represented by zeroing the quantity, never by deletion; the
/// id stays immutable once promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub description: Option<String>,
    pub classification: Classification,
    pub quantity: Decimal,
    pub unit: Unit,
    pub related_lot: LotId,
}

impl Item {
    /// An item with zero quantity has been removed from the procurement.
    pub fn is_live(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// The zero-quantity rendition of this item (identity preserved).
    pub fn zeroed(mut self) -> Self {
        self.quantity = Decimal::ZERO;
        self
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
