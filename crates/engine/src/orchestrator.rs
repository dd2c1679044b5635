//! Update orchestration: the one place that sequences a reconciliation
//! pass end to end.
//!
//! Pipeline for a revision-carrying operation:
//!
//! ```text
//! Revision
//!   ↓
//! 1. Load snapshot (aggregate + version marker)
//!   ↓
//! 2. Admission check (status machine)
//!   ↓
//! 3. Reconcile lots (minting permanent ids for new keys)
//!   ↓
//! 4. Rewrite lot references in the remaining revision payload
//!   ↓
//! 5. Reconcile items / documents / persons / auction details
//!   ↓
//! 6. Cross-entity validation
//!   ↓
//! 7. Status transition + value / contract-period derivation
//!   ↓
//! 8. Conditional save (compare-and-swap on the loaded marker)
//! ```
//!
//! Every failure happens before the write, so there is never partial
//! state to roll back. A lost race surfaces as a conflict error; the
//! engine performs no retry.

use std::collections::HashSet;

use tendra_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, IdSource, LotId};
use tendra_tender::{BudgetContext, Tender, TenderRevision};

use crate::collections::{AuctionMerge, DocumentMerge, ItemMerge, LotMerge, PersonMerge};
use crate::context::OperationContext;
use crate::continuity::IdContinuity;
use crate::derive::{derive_contract_period, derive_value};
use crate::reconcile::reconcile;
use crate::rewrite::rewrite_revision;
use crate::store::DocumentStore;
use crate::transition::{
    CollectionKind, OperationKind, OperationProfile, admit, apply_transition, cancel_lot,
};
use crate::validate::{ValidationContext, validate_aggregate};

/// Sequences one read-modify-write cycle per operation.
pub struct UpdateOrchestrator<'a, S> {
    store: &'a S,
    ids: &'a dyn IdSource,
}

impl<'a, S: DocumentStore> UpdateOrchestrator<'a, S> {
    pub fn new(store: &'a S, ids: &'a dyn IdSource) -> Self {
        Self { store, ids }
    }

    /// Apply a revision-carrying operation (update, amend,
    /// create-from-previous-stage).
    pub fn execute(
        &self,
        ctx: &OperationContext,
        kind: OperationKind,
        budget: &BudgetContext,
        revision: &TenderRevision,
    ) -> DomainResult<Tender> {
        tracing::info!(process = %ctx.process, stage = %ctx.stage, operation = %kind,
            collections = revision.has_collection_changes(), "reconciliation pass started");
        let result = match kind {
            OperationKind::UpdateTender | OperationKind::AmendTender => {
                self.amend(ctx, kind.profile(), budget, revision)
            }
            OperationKind::CreateFromPlanning => {
                self.create_from_previous(ctx, kind.profile(), budget, revision)
            }
            _ => Err(DomainError::validation(format!(
                "operation {kind} does not take a revision"
            ))),
        };
        self.report(ctx, kind, result)
    }

    /// Apply a status-only operation (suspend, resume, cancel).
    pub fn transition(&self, ctx: &OperationContext, kind: OperationKind) -> DomainResult<Tender> {
        tracing::info!(process = %ctx.process, stage = %ctx.stage, operation = %kind,
            "status transition started");
        let result = match kind {
            OperationKind::SuspendTender
            | OperationKind::ResumeTender
            | OperationKind::CancelTender
            | OperationKind::CancelPlanning => self.transition_only(ctx, kind.profile()),
            _ => Err(DomainError::validation(format!(
                "operation {kind} requires a revision"
            ))),
        };
        self.report(ctx, kind, result)
    }

    /// Cancel a single lot and re-derive the aggregate scalars.
    pub fn cancel_lot(&self, ctx: &OperationContext, lot_id: &LotId) -> DomainResult<Tender> {
        let kind = OperationKind::CancelLot;
        let profile = kind.profile();
        tracing::info!(process = %ctx.process, stage = %ctx.stage, lot = %lot_id,
            "lot cancellation started");

        let result = (|| {
            let snapshot = self.load(ctx)?;
            admit(&snapshot.tender, profile)?;

            let mut found = false;
            let mut lots = Vec::with_capacity(snapshot.tender.lots().len());
            for lot in snapshot.tender.lots() {
                if &lot.id == lot_id {
                    found = true;
                    lots.push(cancel_lot(lot)?);
                } else {
                    lots.push(lot.clone());
                }
            }
            if !found {
                return Err(DomainError::not_found(format!("lot {lot_id}")));
            }

            let mut next = snapshot.tender.clone();
            next.set_lots(lots);

            let active: HashSet<LotId> =
                next.active_lots().map(|lot| lot.id.clone()).collect();
            let retained_details = next
                .auction_details()
                .iter()
                .filter(|detail| active.contains(&detail.related_lot))
                .cloned()
                .collect();
            next.set_auction_details(retained_details);

            // With no lot left active the previously derived figures stand.
            if next.active_lots().next().is_some() {
                next.set_value(Some(derive_value(next.lots())?));
                next.set_contract_period(Some(derive_contract_period(next.lots())?));
            }

            self.commit(next, snapshot.version)
        })();
        self.report(ctx, kind, result)
    }

    fn amend(
        &self,
        ctx: &OperationContext,
        profile: &OperationProfile,
        budget: &BudgetContext,
        revision: &TenderRevision,
    ) -> DomainResult<Tender> {
        let snapshot = self.load(ctx)?;
        admit(&snapshot.tender, profile)?;
        let next = self.reconcile_pass(&snapshot.tender, ctx, profile, budget, revision)?;
        self.commit(next, snapshot.version)
    }

    fn create_from_previous(
        &self,
        ctx: &OperationContext,
        profile: &OperationProfile,
        budget: &BudgetContext,
        revision: &TenderRevision,
    ) -> DomainResult<Tender> {
        let previous = ctx.previous_reference().ok_or_else(|| {
            DomainError::validation("previous stage is required for create-from-previous-stage")
        })?;
        let snapshot = self
            .store
            .get(&previous)?
            .ok_or_else(|| DomainError::not_found(format!("tender {previous}")))?;
        admit(&snapshot.tender, profile)?;

        let target = ctx.reference();
        if self.store.get(&target)?.is_some() {
            return Err(DomainError::conflict(format!("stage {target} already exists")));
        }

        let seed = snapshot.tender.clone().with_reference(target);
        let next = self.reconcile_pass(&seed, ctx, profile, budget, revision)?;
        self.commit(next, 0)
    }

    fn transition_only(
        &self,
        ctx: &OperationContext,
        profile: &OperationProfile,
    ) -> DomainResult<Tender> {
        let snapshot = self.load(ctx)?;
        admit(&snapshot.tender, profile)?;

        let mut next = snapshot.tender.clone();
        if matches!(
            profile.kind,
            OperationKind::CancelTender | OperationKind::CancelPlanning
        ) {
            let lots = next
                .lots()
                .iter()
                .map(|lot| {
                    if lot.status.is_terminal() {
                        lot.clone()
                    } else {
                        lot.clone().cancelled()
                    }
                })
                .collect();
            next.set_lots(lots);
            next.set_auction_details(Vec::new());
        }
        apply_transition(&mut next, profile);
        self.commit(next, snapshot.version)
    }

    /// The collection-by-collection merge, validation and derivation for
    /// one revision against one stored aggregate.
    fn reconcile_pass(
        &self,
        stored: &Tender,
        ctx: &OperationContext,
        profile: &OperationProfile,
        budget: &BudgetContext,
        revision: &TenderRevision,
    ) -> DomainResult<Tender> {
        let mut revision = revision.clone();

        let mut lot_continuity = IdContinuity::new(self.ids);
        let mut lots = {
            let mut merge = LotMerge {
                continuity: &mut lot_continuity,
                editable: profile.editable_lot_statuses,
                cancel_missing: profile.cancel_missing_lots,
                created_status: profile.created_lot_status,
                required: profile.requires(CollectionKind::Lots),
            };
            reconcile(&mut merge, stored.lots(), &revision.lots)?
        };
        if let Some((status, details)) = profile.force_lot_status {
            for lot in &mut lots {
                if !lot.status.is_terminal() {
                    lot.status = status;
                    lot.status_details = details;
                }
            }
        }

        rewrite_revision(&mut revision, lot_continuity.mapping());

        let mut item_continuity = IdContinuity::new(self.ids);
        let items = {
            let mut merge = ItemMerge {
                continuity: &mut item_continuity,
                required: profile.requires(CollectionKind::Items),
            };
            reconcile(&mut merge, stored.items(), &revision.items)?
        };

        let documents = {
            let mut merge = DocumentMerge {
                published_at: ctx.start_date,
                required: profile.requires(CollectionKind::Documents),
            };
            reconcile(&mut merge, stored.documents(), &revision.documents)?
        };

        let persons = match &revision.procuring_entity {
            Some(entity_revision) => {
                let mut merge = PersonMerge {
                    published_at: ctx.start_date,
                    required: profile.requires(CollectionKind::Persons),
                };
                reconcile(
                    &mut merge,
                    &stored.procuring_entity().persons,
                    &entity_revision.persons,
                )?
            }
            None => stored.procuring_entity().persons.clone(),
        };

        let active_lot_ids: HashSet<LotId> = lots
            .iter()
            .filter(|lot| lot.is_active())
            .map(|lot| lot.id.clone())
            .collect();
        let auction_details = {
            let mut merge = AuctionMerge {
                active_lot_ids: &active_lot_ids,
            };
            reconcile(&mut merge, stored.auction_details(), &revision.auction_details)?
        };

        let mut next = stored.clone();
        if let Some(title) = revision.title {
            next.set_title(title);
        }
        if let Some(description) = revision.description {
            next.set_description(Some(description));
        }
        if let Some(period) = revision.tender_period {
            next.set_tender_period(Some(period));
        }
        let mut entity = stored.procuring_entity().clone();
        if let Some(entity_revision) = &revision.procuring_entity {
            if let Some(name) = &entity_revision.name {
                entity.name = name.clone();
            }
        }
        entity.persons = persons;
        next.set_procuring_entity(entity);
        next.set_lots(lots);
        next.set_items(items);
        next.set_documents(documents);
        next.set_auction_details(auction_details);

        let ceiling = stored
            .value()
            .map(|value| value.amount())
            .unwrap_or(budget.ceiling);
        let reference_instant = next
            .tender_period()
            .map(|period| period.end())
            .unwrap_or(ctx.start_date);
        let validation = ValidationContext {
            budget,
            ceiling,
            reference_instant,
            require_coverage: profile.require_coverage,
        };
        validate_aggregate(&next, &validation)?;

        apply_transition(&mut next, profile);

        if next.active_lots().next().is_some() {
            next.set_value(Some(derive_value(next.lots())?));
            next.set_contract_period(Some(derive_contract_period(next.lots())?));
        } else if profile.requires_active_lots {
            return Err(DomainError::NoActiveLots);
        }

        Ok(next)
    }

    fn load(&self, ctx: &OperationContext) -> DomainResult<crate::store::Snapshot> {
        let reference = ctx.reference();
        self.store
            .get(&reference)?
            .ok_or_else(|| DomainError::not_found(format!("tender {reference}")))
    }

    fn commit(&self, mut next: Tender, expected_version: u64) -> DomainResult<Tender> {
        next.set_version(expected_version + 1);
        let applied = self
            .store
            .save(&next, ExpectedVersion::Exact(expected_version))?;
        if !applied {
            return Err(DomainError::conflict(format!(
                "tender {} was modified concurrently",
                next.reference()
            )));
        }
        Ok(next)
    }

    fn report(
        &self,
        ctx: &OperationContext,
        kind: OperationKind,
        result: DomainResult<Tender>,
    ) -> DomainResult<Tender> {
        match &result {
            Ok(tender) => {
                tracing::info!(process = %ctx.process, stage = %ctx.stage, operation = %kind,
                    version = tender.version(), "pass accepted");
            }
            Err(err) => {
                tracing::warn!(process = %ctx.process, stage = %ctx.stage, operation = %kind,
                    error = %err, "pass rejected");
            }
        }
        result
    }
}
