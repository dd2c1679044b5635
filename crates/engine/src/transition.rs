//! Operation-scoped status transitions.
//!
//! Each operation kind resolves to a configuration record instead of
//! branching on method codes inline: the allowed source (status,
//! status-details) pairs, which lot statuses the operation may edit,
//! which collections it requires, and the target pair it leaves behind.
//! Terminal statuses appear in no allowed-source set, which makes them
//! sinks.

use tendra_core::{DomainError, DomainResult};
use tendra_tender::{Lot, LotStatus, LotStatusDetails, Tender, TenderStatus, TenderStatusDetails};

/// The operations the engine executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    UpdateTender,
    AmendTender,
    CreateFromPlanning,
    SuspendTender,
    ResumeTender,
    CancelTender,
    CancelPlanning,
    CancelLot,
}

impl core::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            OperationKind::UpdateTender => "update-tender",
            OperationKind::AmendTender => "amend-tender",
            OperationKind::CreateFromPlanning => "create-from-planning",
            OperationKind::SuspendTender => "suspend-tender",
            OperationKind::ResumeTender => "resume-tender",
            OperationKind::CancelTender => "cancel-tender",
            OperationKind::CancelPlanning => "cancel-planning",
            OperationKind::CancelLot => "cancel-lot",
        };
        f.write_str(s)
    }
}

/// Collections an operation may require to stay populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Lots,
    Items,
    Documents,
    Persons,
}

/// Per-operation configuration record.
#[derive(Debug)]
pub struct OperationProfile {
    pub kind: OperationKind,
    /// (status, status-details) pairs the operation may start from.
    pub allowed_source: &'static [(TenderStatus, TenderStatusDetails)],
    /// Lot statuses whose fields the operation may edit; any other status
    /// freezes the lot.
    pub editable_lot_statuses: &'static [LotStatus],
    /// Whether a lot absent from the revision is retained as cancelled.
    pub cancel_missing_lots: bool,
    pub required_collections: &'static [CollectionKind],
    pub require_coverage: bool,
    /// Whether the pass must leave at least one active lot.
    pub requires_active_lots: bool,
    /// Status pair given to lots created by the revision.
    pub created_lot_status: (LotStatus, LotStatusDetails),
    /// Status pair forced onto every non-terminal lot (stage promotion).
    pub force_lot_status: Option<(LotStatus, LotStatusDetails)>,
    /// Tender status pair applied once validation passed.
    pub target: Option<(TenderStatus, TenderStatusDetails)>,
}

impl OperationProfile {
    pub fn requires(&self, collection: CollectionKind) -> bool {
        self.required_collections.contains(&collection)
    }
}

static UPDATE_TENDER: OperationProfile = OperationProfile {
    kind: OperationKind::UpdateTender,
    allowed_source: &[(TenderStatus::Planning, TenderStatusDetails::Empty)],
    editable_lot_statuses: &[LotStatus::Planning],
    cancel_missing_lots: true,
    required_collections: &[CollectionKind::Lots, CollectionKind::Items],
    require_coverage: true,
    requires_active_lots: true,
    created_lot_status: (LotStatus::Planning, LotStatusDetails::Empty),
    force_lot_status: None,
    target: None,
};

static AMEND_TENDER: OperationProfile = OperationProfile {
    kind: OperationKind::AmendTender,
    allowed_source: &[(TenderStatus::Active, TenderStatusDetails::Empty)],
    editable_lot_statuses: &[LotStatus::Active],
    cancel_missing_lots: true,
    required_collections: &[
        CollectionKind::Lots,
        CollectionKind::Items,
        CollectionKind::Persons,
    ],
    require_coverage: true,
    requires_active_lots: true,
    created_lot_status: (LotStatus::Active, LotStatusDetails::Empty),
    force_lot_status: None,
    target: None,
};

static CREATE_FROM_PLANNING: OperationProfile = OperationProfile {
    kind: OperationKind::CreateFromPlanning,
    allowed_source: &[
        (TenderStatus::Planning, TenderStatusDetails::Empty),
        (TenderStatus::Planned, TenderStatusDetails::Empty),
    ],
    editable_lot_statuses: &[LotStatus::Planning, LotStatus::Planned],
    cancel_missing_lots: true,
    required_collections: &[CollectionKind::Lots, CollectionKind::Items],
    require_coverage: true,
    requires_active_lots: true,
    created_lot_status: (LotStatus::Active, LotStatusDetails::Empty),
    force_lot_status: Some((LotStatus::Active, LotStatusDetails::Empty)),
    target: Some((TenderStatus::Active, TenderStatusDetails::Empty)),
};

static SUSPEND_TENDER: OperationProfile = OperationProfile {
    kind: OperationKind::SuspendTender,
    allowed_source: &[(TenderStatus::Active, TenderStatusDetails::Empty)],
    editable_lot_statuses: &[],
    cancel_missing_lots: false,
    required_collections: &[],
    require_coverage: false,
    requires_active_lots: false,
    created_lot_status: (LotStatus::Planning, LotStatusDetails::Empty),
    force_lot_status: None,
    target: Some((TenderStatus::Suspended, TenderStatusDetails::Suspended)),
};

static RESUME_TENDER: OperationProfile = OperationProfile {
    kind: OperationKind::ResumeTender,
    allowed_source: &[(TenderStatus::Suspended, TenderStatusDetails::Suspended)],
    editable_lot_statuses: &[],
    cancel_missing_lots: false,
    required_collections: &[],
    require_coverage: false,
    requires_active_lots: false,
    created_lot_status: (LotStatus::Planning, LotStatusDetails::Empty),
    force_lot_status: None,
    target: Some((TenderStatus::Active, TenderStatusDetails::Empty)),
};

static CANCEL_TENDER: OperationProfile = OperationProfile {
    kind: OperationKind::CancelTender,
    allowed_source: &[
        (TenderStatus::Active, TenderStatusDetails::Empty),
        (TenderStatus::Active, TenderStatusDetails::Suspended),
        (TenderStatus::Suspended, TenderStatusDetails::Suspended),
    ],
    editable_lot_statuses: &[],
    cancel_missing_lots: false,
    required_collections: &[],
    require_coverage: false,
    requires_active_lots: false,
    created_lot_status: (LotStatus::Planning, LotStatusDetails::Empty),
    force_lot_status: None,
    target: Some((TenderStatus::Cancelled, TenderStatusDetails::Empty)),
};

static CANCEL_PLANNING: OperationProfile = OperationProfile {
    kind: OperationKind::CancelPlanning,
    allowed_source: &[
        (TenderStatus::Planning, TenderStatusDetails::Empty),
        (TenderStatus::Planned, TenderStatusDetails::Empty),
    ],
    editable_lot_statuses: &[],
    cancel_missing_lots: false,
    required_collections: &[],
    require_coverage: false,
    requires_active_lots: false,
    created_lot_status: (LotStatus::Planning, LotStatusDetails::Empty),
    force_lot_status: None,
    target: Some((TenderStatus::Cancelled, TenderStatusDetails::Empty)),
};

static CANCEL_LOT: OperationProfile = OperationProfile {
    kind: OperationKind::CancelLot,
    allowed_source: &[(TenderStatus::Active, TenderStatusDetails::Empty)],
    editable_lot_statuses: &[],
    cancel_missing_lots: false,
    required_collections: &[],
    require_coverage: false,
    requires_active_lots: false,
    created_lot_status: (LotStatus::Planning, LotStatusDetails::Empty),
    force_lot_status: None,
    target: None,
};

impl OperationKind {
    /// The configuration record for this operation.
    pub fn profile(self) -> &'static OperationProfile {
        match self {
            OperationKind::UpdateTender => &UPDATE_TENDER,
            OperationKind::AmendTender => &AMEND_TENDER,
            OperationKind::CreateFromPlanning => &CREATE_FROM_PLANNING,
            OperationKind::SuspendTender => &SUSPEND_TENDER,
            OperationKind::ResumeTender => &RESUME_TENDER,
            OperationKind::CancelTender => &CANCEL_TENDER,
            OperationKind::CancelPlanning => &CANCEL_PLANNING,
            OperationKind::CancelLot => &CANCEL_LOT,
        }
    }
}

/// Check that the stored aggregate admits this operation.
pub fn admit(tender: &Tender, profile: &OperationProfile) -> DomainResult<()> {
    let pair = (tender.status(), tender.status_details());
    if !profile.allowed_source.contains(&pair) {
        return Err(DomainError::transition(
            "tender",
            format!("{}/{}", pair.0, pair.1),
            profile.kind.to_string(),
        ));
    }
    Ok(())
}

/// Apply the profile's target status pair, if it defines one.
pub fn apply_transition(tender: &mut Tender, profile: &OperationProfile) {
    if let Some((status, details)) = profile.target {
        tender.set_status(status, details);
    }
}

/// Cancel a single lot; terminal lots admit no further transition.
pub fn cancel_lot(lot: &Lot) -> DomainResult<Lot> {
    if lot.status.is_terminal() {
        return Err(DomainError::transition(
            format!("lot {}", lot.id),
            lot.status.to_string(),
            LotStatus::Cancelled.to_string(),
        ));
    }
    Ok(lot.clone().cancelled())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tendra_core::{LotId, Money, Period, ProcessId, Stage};
    use chrono::{TimeZone, Utc};
    use tendra_core::Currency;
    use tendra_parties::{Address, Identifier, ProcuringEntity};
    use tendra_tender::TenderRef;

    fn tender(status: TenderStatus, details: TenderStatusDetails) -> Tender {
        let mut t = Tender::new(
            TenderRef::new(ProcessId::new("p-1"), Stage::new("tender")),
            "works".to_string(),
            status,
            ProcuringEntity {
                name: "city hall".to_string(),
                identifier: Identifier {
                    scheme: "MD-IDNO".to_string(),
                    id: "1".to_string(),
                    legal_name: "city hall".to_string(),
                },
                address: Address {
                    country: "MD".to_string(),
                    region: None,
                    locality: None,
                    street: None,
                    postal_code: None,
                },
                persons: Vec::new(),
            },
        );
        t.set_status(status, details);
        t
    }

    #[test]
    fn cancel_predicate_sets_are_disjoint() {
        for pair in CANCEL_TENDER.allowed_source {
            assert!(!CANCEL_PLANNING.allowed_source.contains(pair));
        }
    }

    #[test]
    fn no_profile_admits_a_terminal_tender() {
        for status in [
            TenderStatus::Cancelled,
            TenderStatus::Complete,
            TenderStatus::Unsuccessful,
        ] {
            for kind in [
                OperationKind::UpdateTender,
                OperationKind::AmendTender,
                OperationKind::CreateFromPlanning,
                OperationKind::SuspendTender,
                OperationKind::ResumeTender,
                OperationKind::CancelTender,
                OperationKind::CancelPlanning,
                OperationKind::CancelLot,
            ] {
                let t = tender(status, TenderStatusDetails::Empty);
                assert!(admit(&t, kind.profile()).is_err(), "{kind} admitted {status}");
            }
        }
    }

    #[test]
    fn cancel_tender_rejected_from_planning() {
        let t = tender(TenderStatus::Planning, TenderStatusDetails::Empty);
        match admit(&t, OperationKind::CancelTender.profile()) {
            Err(DomainError::InvalidStatusTransition { entity, from, to }) => {
                assert_eq!(entity, "tender");
                assert_eq!(from, "planning/empty");
                assert_eq!(to, "cancel-tender");
            }
            other => panic!("expected transition error, got {other:?}"),
        }
        assert!(admit(&t, OperationKind::CancelPlanning.profile()).is_ok());
    }

    #[test]
    fn suspend_resume_round_trip() {
        let mut t = tender(TenderStatus::Active, TenderStatusDetails::Empty);

        admit(&t, OperationKind::SuspendTender.profile()).unwrap();
        apply_transition(&mut t, OperationKind::SuspendTender.profile());
        assert_eq!(t.status(), TenderStatus::Suspended);
        assert_eq!(t.status_details(), TenderStatusDetails::Suspended);

        admit(&t, OperationKind::ResumeTender.profile()).unwrap();
        apply_transition(&mut t, OperationKind::ResumeTender.profile());
        assert_eq!(t.status(), TenderStatus::Active);
        assert_eq!(t.status_details(), TenderStatusDetails::Empty);
    }

    #[test]
    fn cancelling_a_terminal_lot_fails() {
        let lot = Lot {
            id: LotId::new("L1"),
            title: "lot".to_string(),
            description: None,
            status: LotStatus::Complete,
            status_details: tendra_tender::LotStatusDetails::Empty,
            value: Money::new(1.into(), Currency::new("EUR").unwrap()),
            contract_period: Period::new(
                Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            )
            .unwrap(),
            place_of_performance: None,
        };
        assert!(cancel_lot(&lot).is_err());
    }
}
