use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use tendra_core::{AggregateRoot, LotId, Money, Period, ProcessId, Stage};
use tendra_parties::ProcuringEntity;

use crate::auction::AuctionLotDetail;
use crate::document::Document;
use crate::item::Item;
use crate::lot::Lot;
use crate::status::{TenderStatus, TenderStatusDetails};

/// Aggregate identity: one tender document per process stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenderRef {
    pub process: ProcessId,
    pub stage: Stage,
}

impl TenderRef {
    pub fn new(process: ProcessId, stage: Stage) -> Self {
        Self { process, stage }
    }
}

impl core::fmt::Display for TenderRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.process, self.stage)
    }
}

/// Aggregate root: the full tender document for one process/stage.
///
/// Owned exclusively by one reconciliation pass from load to conditional
/// save; persisted atomically as one unit. Value and contract period are
/// derived from the active lots and recomputed on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tender {
    reference: TenderRef,
    title: String,
    description: Option<String>,
    status: TenderStatus,
    status_details: TenderStatusDetails,
    value: Option<Money>,
    tender_period: Option<Period>,
    contract_period: Option<Period>,
    lots: Vec<Lot>,
    items: Vec<Item>,
    documents: Vec<Document>,
    auction_details: Vec<AuctionLotDetail>,
    procuring_entity: ProcuringEntity,
    version: u64,
}

impl Tender {
    /// A fresh aggregate with empty collections, before any reconciliation.
    pub fn new(
        reference: TenderRef,
        title: String,
        status: TenderStatus,
        procuring_entity: ProcuringEntity,
    ) -> Self {
        Self {
            reference,
            title,
            description: None,
            status,
            status_details: TenderStatusDetails::Empty,
            value: None,
            tender_period: None,
            contract_period: None,
            lots: Vec::new(),
            items: Vec::new(),
            documents: Vec::new(),
            auction_details: Vec::new(),
            procuring_entity,
            version: 0,
        }
    }

    pub fn reference(&self) -> &TenderRef {
        &self.reference
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TenderStatus {
        self.status
    }

    pub fn status_details(&self) -> TenderStatusDetails {
        self.status_details
    }

    pub fn value(&self) -> Option<&Money> {
        self.value.as_ref()
    }

    pub fn tender_period(&self) -> Option<&Period> {
        self.tender_period.as_ref()
    }

    pub fn contract_period(&self) -> Option<&Period> {
        self.contract_period.as_ref()
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn auction_details(&self) -> &[AuctionLotDetail] {
        &self.auction_details
    }

    pub fn procuring_entity(&self) -> &ProcuringEntity {
        &self.procuring_entity
    }

    pub fn active_lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter().filter(|lot| lot.is_active())
    }

    pub fn lot_ids(&self) -> HashSet<&LotId> {
        self.lots.iter().map(|lot| &lot.id).collect()
    }

    // -- pass mutators: the orchestrator rebuilds the aggregate field by
    // -- field from reconciled collections and derived scalars.

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_status(&mut self, status: TenderStatus, details: TenderStatusDetails) {
        self.status = status;
        self.status_details = details;
    }

    pub fn set_value(&mut self, value: Option<Money>) {
        self.value = value;
    }

    pub fn set_tender_period(&mut self, period: Option<Period>) {
        self.tender_period = period;
    }

    pub fn set_contract_period(&mut self, period: Option<Period>) {
        self.contract_period = period;
    }

    pub fn set_lots(&mut self, lots: Vec<Lot>) {
        self.lots = lots;
    }

    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    pub fn set_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
    }

    pub fn set_auction_details(&mut self, details: Vec<AuctionLotDetail>) {
        self.auction_details = details;
    }

    pub fn set_procuring_entity(&mut self, entity: ProcuringEntity) {
        self.procuring_entity = entity;
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Rebind this aggregate to a new stage (create-from-previous-stage).
    pub fn with_reference(mut self, reference: TenderRef) -> Self {
        self.reference = reference;
        self.version = 0;
        self
    }
}

impl AggregateRoot for Tender {
    type Id = TenderRef;

    fn id(&self) -> &Self::Id {
        &self.reference
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{LotStatus, LotStatusDetails};
    use chrono::{TimeZone, Utc};
    use tendra_core::Currency;
    use tendra_parties::{Address, Identifier};

    fn test_entity() -> ProcuringEntity {
        ProcuringEntity {
            name: "ministry".to_string(),
            identifier: Identifier {
                scheme: "MD-IDNO".to_string(),
                id: "1".to_string(),
                legal_name: "ministry".to_string(),
            },
            address: Address {
                country: "MD".to_string(),
                region: None,
                locality: None,
                street: None,
                postal_code: None,
            },
            persons: Vec::new(),
        }
    }

    fn test_lot(id: &str, status: LotStatus) -> Lot {
        Lot {
            id: LotId::new(id),
            title: format!("lot {id}"),
            description: None,
            status,
            status_details: LotStatusDetails::Empty,
            value: Money::new(100.into(), Currency::new("EUR").unwrap()),
            contract_period: Period::new(
                Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            )
            .unwrap(),
            place_of_performance: None,
        }
    }

    #[test]
    fn active_lots_excludes_cancelled() {
        let mut tender = Tender::new(
            TenderRef::new(ProcessId::new("p-1"), Stage::new("tender")),
            "works".to_string(),
            TenderStatus::Active,
            test_entity(),
        );
        tender.set_lots(vec![
            test_lot("L1", LotStatus::Active),
            test_lot("L2", LotStatus::Cancelled),
        ]);
        let active: Vec<_> = tender.active_lots().map(|l| l.id.as_str()).collect();
        assert_eq!(active, vec!["L1"]);
        assert_eq!(tender.lot_ids().len(), 2);
    }

    #[test]
    fn rebinding_resets_version() {
        let mut tender = Tender::new(
            TenderRef::new(ProcessId::new("p-1"), Stage::new("planning")),
            "works".to_string(),
            TenderStatus::Planning,
            test_entity(),
        );
        tender.set_version(4);
        let next = tender.with_reference(TenderRef::new(
            ProcessId::new("p-1"),
            Stage::new("tender"),
        ));
        assert_eq!(next.version(), 0);
        assert_eq!(next.reference().stage, Stage::new("tender"));
    }
}
