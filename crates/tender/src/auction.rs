use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tendra_core::{Entity, LotId, Money};

/// Electronic-auction parameters for one lot.
///
/// Keyed by the lot it belongs to; at most one detail per lot. A detail
/// whose lot is cancelled during a pass is dropped with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionLotDetail {
    pub related_lot: LotId,
    pub start_date: DateTime<Utc>,
    pub bid_step: Option<Money>,
}

impl Entity for AuctionLotDetail {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.related_lot
    }
}
