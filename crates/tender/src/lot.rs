use serde::{Deserialize, Serialize};

use tendra_core::{Entity, LotId, Money, Period};
use tendra_parties::Address;

use crate::status::{LotStatus, LotStatusDetails};

/// Where the lot's subject matter is delivered or performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOfPerformance {
    pub address: Option<Address>,
    pub description: Option<String>,
}

/// Lot: the unit a supplier bids on.
///
/// A lot is never physically deleted. Absence from a revision marks it
/// cancelled; its permanent id stays stable forever after promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub title: String,
    pub description: Option<String>,
    pub status: LotStatus,
    pub status_details: LotStatusDetails,
    pub value: Money,
    pub contract_period: Period,
    pub place_of_performance: Option<PlaceOfPerformance>,
}

impl Lot {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The cancelled rendition of this lot (identity preserved).
    pub fn cancelled(mut self) -> Self {
        self.status = LotStatus::Cancelled;
        self.status_details = LotStatusDetails::Empty;
        self
    }
}

impl Entity for Lot {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
