//! [`KeyedMerge`] policies for every keyed collection of the aggregate.
//!
//! Missing-key policy per collection: lots are retained as cancelled,
//! items are retained with quantity zeroed, documents / persons / business
//! functions are kept unchanged ("not included" semantics), auction
//! details survive only while their lot stays active.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tendra_core::{DomainError, DomainResult, ItemId, LotId};
use tendra_parties::{
    BusinessFunction, BusinessFunctionDocument, BusinessFunctionDocumentRevision,
    BusinessFunctionRevision, Person, PersonRevision,
};
use tendra_tender::{
    AuctionDetailRevision, AuctionLotDetail, Document, DocumentRevision, Item, ItemRevision, Lot,
    LotRevision, LotStatus, LotStatusDetails,
};

use crate::continuity::IdContinuity;
use crate::reconcile::{KeyedMerge, reconcile};

fn require<T>(value: Option<T>, entity: &str, field: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("{entity}: {field} is required")))
}

/// Lot merge: new keys are promoted to permanent ids, edits are gated on
/// the operation's editable statuses, missing keys cancel the lot.
pub struct LotMerge<'a, 'b> {
    pub continuity: &'b mut IdContinuity<'a>,
    pub editable: &'static [LotStatus],
    pub cancel_missing: bool,
    pub created_status: (LotStatus, LotStatusDetails),
    pub required: bool,
}

impl KeyedMerge for LotMerge<'_, '_> {
    type Received = LotRevision;
    type Stored = Lot;

    fn label(&self) -> &'static str {
        "lots"
    }

    fn received_key(&self, received: &LotRevision) -> String {
        received.id.as_str().to_string()
    }

    fn stored_key(&self, stored: &Lot) -> String {
        stored.id.as_str().to_string()
    }

    fn update(&mut self, stored: &Lot, received: &LotRevision) -> DomainResult<Lot> {
        if !self.editable.contains(&stored.status) {
            return Err(DomainError::InvalidLotStatus {
                lot_id: stored.id.to_string(),
                status: stored.status.to_string(),
            });
        }
        Ok(Lot {
            id: stored.id.clone(),
            title: received.title.clone().unwrap_or_else(|| stored.title.clone()),
            description: received
                .description
                .clone()
                .or_else(|| stored.description.clone()),
            status: stored.status,
            status_details: stored.status_details,
            value: received.value.clone().unwrap_or_else(|| stored.value.clone()),
            contract_period: received.contract_period.unwrap_or(stored.contract_period),
            place_of_performance: received
                .place_of_performance
                .clone()
                .or_else(|| stored.place_of_performance.clone()),
        })
    }

    fn create(&mut self, received: &LotRevision) -> DomainResult<Lot> {
        let entity = format!("lot {}", received.id);
        let title = require(received.title.clone(), &entity, "title")?;
        let value = require(received.value.clone(), &entity, "value")?;
        let contract_period = require(received.contract_period, &entity, "contractPeriod")?;
        let (status, status_details) = self.created_status;
        Ok(Lot {
            id: LotId::new(self.continuity.resolve(received.id.as_str())),
            title,
            description: received.description.clone(),
            status,
            status_details,
            value,
            contract_period,
            place_of_performance: received.place_of_performance.clone(),
        })
    }

    fn missing(&mut self, stored: &Lot) -> DomainResult<Option<Lot>> {
        if self.cancel_missing {
            Ok(Some(stored.clone().cancelled()))
        } else {
            Ok(Some(stored.clone()))
        }
    }

    fn rejects_empty(&self) -> bool {
        self.required
    }
}

/// Item merge: new keys promoted, missing keys zero the quantity, a
/// caller-sent quantity must stay strictly positive.
pub struct ItemMerge<'a, 'b> {
    pub continuity: &'b mut IdContinuity<'a>,
    pub required: bool,
}

impl KeyedMerge for ItemMerge<'_, '_> {
    type Received = ItemRevision;
    type Stored = Item;

    fn label(&self) -> &'static str {
        "items"
    }

    fn received_key(&self, received: &ItemRevision) -> String {
        received.id.as_str().to_string()
    }

    fn stored_key(&self, stored: &Item) -> String {
        stored.id.as_str().to_string()
    }

    fn update(&mut self, stored: &Item, received: &ItemRevision) -> DomainResult<Item> {
        if let Some(quantity) = received.quantity {
            if quantity <= Decimal::ZERO {
                return Err(DomainError::NonPositiveQuantity {
                    item_id: stored.id.to_string(),
                });
            }
        }
        Ok(Item {
            id: stored.id.clone(),
            description: received
                .description
                .clone()
                .or_else(|| stored.description.clone()),
            classification: received
                .classification
                .clone()
                .unwrap_or_else(|| stored.classification.clone()),
            quantity: received.quantity.unwrap_or(stored.quantity),
            unit: received.unit.clone().unwrap_or_else(|| stored.unit.clone()),
            related_lot: received
                .related_lot
                .clone()
                .unwrap_or_else(|| stored.related_lot.clone()),
        })
    }

    fn create(&mut self, received: &ItemRevision) -> DomainResult<Item> {
        let entity = format!("item {}", received.id);
        let quantity = require(received.quantity, &entity, "quantity")?;
        if quantity <= Decimal::ZERO {
            return Err(DomainError::NonPositiveQuantity {
                item_id: received.id.to_string(),
            });
        }
        Ok(Item {
            id: ItemId::new(self.continuity.resolve(received.id.as_str())),
            description: received.description.clone(),
            classification: require(received.classification.clone(), &entity, "classification")?,
            quantity,
            unit: require(received.unit.clone(), &entity, "unit")?,
            related_lot: require(received.related_lot.clone(), &entity, "relatedLot")?,
        })
    }

    fn missing(&mut self, stored: &Item) -> DomainResult<Option<Item>> {
        Ok(Some(stored.clone().zeroed()))
    }

    fn rejects_empty(&self) -> bool {
        self.required
    }
}

/// Document merge: caller ids are stable, title/description are
/// overwritten, `related_lots` is unioned with the stored set.
pub struct DocumentMerge {
    pub published_at: DateTime<Utc>,
    pub required: bool,
}

impl KeyedMerge for DocumentMerge {
    type Received = DocumentRevision;
    type Stored = Document;

    fn label(&self) -> &'static str {
        "documents"
    }

    fn received_key(&self, received: &DocumentRevision) -> String {
        received.id.as_str().to_string()
    }

    fn stored_key(&self, stored: &Document) -> String {
        stored.id.as_str().to_string()
    }

    fn update(&mut self, stored: &Document, received: &DocumentRevision) -> DomainResult<Document> {
        let mut related_lots = stored.related_lots.clone();
        related_lots.extend(received.related_lots.iter().cloned());
        Ok(Document {
            id: stored.id.clone(),
            document_type: received.document_type.unwrap_or(stored.document_type),
            title: received.title.clone().unwrap_or_else(|| stored.title.clone()),
            description: received
                .description
                .clone()
                .or_else(|| stored.description.clone()),
            related_lots,
            date_published: stored.date_published,
        })
    }

    fn create(&mut self, received: &DocumentRevision) -> DomainResult<Document> {
        let entity = format!("document {}", received.id);
        Ok(Document {
            id: received.id.clone(),
            document_type: require(received.document_type, &entity, "documentType")?,
            title: require(received.title.clone(), &entity, "title")?,
            description: received.description.clone(),
            related_lots: received.related_lots.iter().cloned().collect(),
            date_published: Some(self.published_at),
        })
    }

    fn missing(&mut self, stored: &Document) -> DomainResult<Option<Document>> {
        Ok(Some(stored.clone()))
    }

    fn rejects_empty(&self) -> bool {
        self.required
    }
}

/// Business-function document merge (innermost nesting level).
pub struct BusinessFunctionDocumentMerge {
    pub published_at: DateTime<Utc>,
}

impl KeyedMerge for BusinessFunctionDocumentMerge {
    type Received = BusinessFunctionDocumentRevision;
    type Stored = BusinessFunctionDocument;

    fn label(&self) -> &'static str {
        "business function documents"
    }

    fn received_key(&self, received: &BusinessFunctionDocumentRevision) -> String {
        received.id.as_str().to_string()
    }

    fn stored_key(&self, stored: &BusinessFunctionDocument) -> String {
        stored.id.as_str().to_string()
    }

    fn update(
        &mut self,
        stored: &BusinessFunctionDocument,
        received: &BusinessFunctionDocumentRevision,
    ) -> DomainResult<BusinessFunctionDocument> {
        Ok(BusinessFunctionDocument {
            id: stored.id.clone(),
            document_type: received
                .document_type
                .clone()
                .unwrap_or_else(|| stored.document_type.clone()),
            title: received.title.clone().unwrap_or_else(|| stored.title.clone()),
            description: received
                .description
                .clone()
                .or_else(|| stored.description.clone()),
            date_published: stored.date_published,
        })
    }

    fn create(
        &mut self,
        received: &BusinessFunctionDocumentRevision,
    ) -> DomainResult<BusinessFunctionDocument> {
        let entity = format!("business function document {}", received.id);
        Ok(BusinessFunctionDocument {
            id: received.id.clone(),
            document_type: require(received.document_type.clone(), &entity, "documentType")?,
            title: require(received.title.clone(), &entity, "title")?,
            description: received.description.clone(),
            date_published: Some(self.published_at),
        })
    }

    fn missing(
        &mut self,
        stored: &BusinessFunctionDocument,
    ) -> DomainResult<Option<BusinessFunctionDocument>> {
        Ok(Some(stored.clone()))
    }
}

/// Business-function merge; reconciles its documents one level deeper.
pub struct BusinessFunctionMerge {
    pub published_at: DateTime<Utc>,
}

impl KeyedMerge for BusinessFunctionMerge {
    type Received = BusinessFunctionRevision;
    type Stored = BusinessFunction;

    fn label(&self) -> &'static str {
        "business functions"
    }

    fn received_key(&self, received: &BusinessFunctionRevision) -> String {
        received.id.as_str().to_string()
    }

    fn stored_key(&self, stored: &BusinessFunction) -> String {
        stored.id.as_str().to_string()
    }

    fn update(
        &mut self,
        stored: &BusinessFunction,
        received: &BusinessFunctionRevision,
    ) -> DomainResult<BusinessFunction> {
        let mut documents_merge = BusinessFunctionDocumentMerge {
            published_at: self.published_at,
        };
        Ok(BusinessFunction {
            id: stored.id.clone(),
            function: received.function.unwrap_or(stored.function),
            job_title: received
                .job_title
                .clone()
                .unwrap_or_else(|| stored.job_title.clone()),
            start_date: received.start_date.unwrap_or(stored.start_date),
            documents: reconcile(&mut documents_merge, &stored.documents, &received.documents)?,
        })
    }

    fn create(&mut self, received: &BusinessFunctionRevision) -> DomainResult<BusinessFunction> {
        let entity = format!("business function {}", received.id);
        let mut documents_merge = BusinessFunctionDocumentMerge {
            published_at: self.published_at,
        };
        Ok(BusinessFunction {
            id: received.id.clone(),
            function: require(received.function, &entity, "type")?,
            job_title: require(received.job_title.clone(), &entity, "jobTitle")?,
            start_date: require(received.start_date, &entity, "startDate")?,
            documents: reconcile(&mut documents_merge, &[], &received.documents)?,
        })
    }

    fn missing(&mut self, stored: &BusinessFunction) -> DomainResult<Option<BusinessFunction>> {
        Ok(Some(stored.clone()))
    }
}

/// Person merge (outermost of the three-level nesting).
pub struct PersonMerge {
    pub published_at: DateTime<Utc>,
    pub required: bool,
}

impl KeyedMerge for PersonMerge {
    type Received = PersonRevision;
    type Stored = Person;

    fn label(&self) -> &'static str {
        "persons"
    }

    fn received_key(&self, received: &PersonRevision) -> String {
        received.id.as_str().to_string()
    }

    fn stored_key(&self, stored: &Person) -> String {
        stored.id.as_str().to_string()
    }

    fn update(&mut self, stored: &Person, received: &PersonRevision) -> DomainResult<Person> {
        let mut functions_merge = BusinessFunctionMerge {
            published_at: self.published_at,
        };
        Ok(Person {
            id: stored.id.clone(),
            title: received.title.clone().or_else(|| stored.title.clone()),
            name: received.name.clone().unwrap_or_else(|| stored.name.clone()),
            identifier: received
                .identifier
                .clone()
                .or_else(|| stored.identifier.clone()),
            business_functions: reconcile(
                &mut functions_merge,
                &stored.business_functions,
                &received.business_functions,
            )?,
        })
    }

    fn create(&mut self, received: &PersonRevision) -> DomainResult<Person> {
        let entity = format!("person {}", received.id);
        let mut functions_merge = BusinessFunctionMerge {
            published_at: self.published_at,
        };
        Ok(Person {
            id: received.id.clone(),
            title: received.title.clone(),
            name: require(received.name.clone(), &entity, "name")?,
            identifier: received.identifier.clone(),
            business_functions: reconcile(
                &mut functions_merge,
                &[],
                &received.business_functions,
            )?,
        })
    }

    fn missing(&mut self, stored: &Person) -> DomainResult<Option<Person>> {
        Ok(Some(stored.clone()))
    }

    fn rejects_empty(&self) -> bool {
        self.required
    }
}

/// Auction-detail merge: keyed by the (already rewritten) related lot; a
/// detail whose lot left the active set this pass is dropped.
pub struct AuctionMerge<'c> {
    pub active_lot_ids: &'c HashSet<LotId>,
}

impl KeyedMerge for AuctionMerge<'_> {
    type Received = AuctionDetailRevision;
    type Stored = AuctionLotDetail;

    fn label(&self) -> &'static str {
        "auction details"
    }

    fn received_key(&self, received: &AuctionDetailRevision) -> String {
        received.related_lot.as_str().to_string()
    }

    fn stored_key(&self, stored: &AuctionLotDetail) -> String {
        stored.related_lot.as_str().to_string()
    }

    fn update(
        &mut self,
        stored: &AuctionLotDetail,
        received: &AuctionDetailRevision,
    ) -> DomainResult<AuctionLotDetail> {
        Ok(AuctionLotDetail {
            related_lot: stored.related_lot.clone(),
            start_date: received.start_date.unwrap_or(stored.start_date),
            bid_step: received.bid_step.clone().or_else(|| stored.bid_step.clone()),
        })
    }

    fn create(&mut self, received: &AuctionDetailRevision) -> DomainResult<AuctionLotDetail> {
        let entity = format!("auction detail for lot {}", received.related_lot);
        Ok(AuctionLotDetail {
            related_lot: received.related_lot.clone(),
            start_date: require(received.start_date, &entity, "startDate")?,
            bid_step: received.bid_step.clone(),
        })
    }

    fn missing(&mut self, stored: &AuctionLotDetail) -> DomainResult<Option<AuctionLotDetail>> {
        if self.active_lot_ids.contains(&stored.related_lot) {
            Ok(Some(stored.clone()))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use tendra_core::{Currency, Money, Period, SequencedIdSource};
    use tendra_tender::DocumentType;

    fn eur() -> Currency {
        Currency::new("EUR").unwrap()
    }

    fn period() -> Period {
        Period::new(
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn stored_lot(id: &str, status: LotStatus) -> Lot {
        Lot {
            id: LotId::new(id),
            title: format!("lot {id}"),
            description: None,
            status,
            status_details: LotStatusDetails::Empty,
            value: Money::new(1000.into(), eur()),
            contract_period: period(),
            place_of_performance: None,
        }
    }

    fn new_lot_revision(id: &str) -> LotRevision {
        LotRevision {
            id: LotId::new(id),
            title: Some(format!("lot {id}")),
            description: None,
            value: Some(Money::new(500.into(), eur())),
            contract_period: Some(period()),
            place_of_performance: None,
        }
    }

    fn update_only_revision(id: &str) -> LotRevision {
        LotRevision {
            id: LotId::new(id),
            title: None,
            description: None,
            value: None,
            contract_period: None,
            place_of_performance: None,
        }
    }

    #[test]
    fn missing_lot_is_retained_as_cancelled() {
        let source = SequencedIdSource::new();
        let mut continuity = IdContinuity::new(&source);
        let mut merge = LotMerge {
            continuity: &mut continuity,
            editable: &[LotStatus::Active],
            cancel_missing: true,
            created_status: (LotStatus::Active, LotStatusDetails::Empty),
            required: true,
        };

        let stored = vec![
            stored_lot("L1", LotStatus::Active),
            stored_lot("L2", LotStatus::Active),
        ];
        let received = vec![update_only_revision("L1")];

        let result = reconcile(&mut merge, &stored, &received).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].status, LotStatus::Active);
        assert_eq!(result[1].id, LotId::new("L2"));
        assert_eq!(result[1].status, LotStatus::Cancelled);
        assert_eq!(continuity.minted(), 0);
    }

    #[test]
    fn editing_a_frozen_lot_is_rejected() {
        let source = SequencedIdSource::new();
        let mut continuity = IdContinuity::new(&source);
        let mut merge = LotMerge {
            continuity: &mut continuity,
            editable: &[LotStatus::Planning],
            cancel_missing: true,
            created_status: (LotStatus::Planning, LotStatusDetails::Empty),
            required: true,
        };

        let stored = vec![stored_lot("L1", LotStatus::Complete)];
        let received = vec![update_only_revision("L1")];

        match reconcile(&mut merge, &stored, &received) {
            Err(DomainError::InvalidLotStatus { lot_id, status }) => {
                assert_eq!(lot_id, "L1");
                assert_eq!(status, "complete");
            }
            other => panic!("expected frozen-lot error, got {other:?}"),
        }
    }

    #[test]
    fn creating_a_lot_without_value_names_the_field() {
        let source = SequencedIdSource::new();
        let mut continuity = IdContinuity::new(&source);
        let mut merge = LotMerge {
            continuity: &mut continuity,
            editable: &[LotStatus::Planning],
            cancel_missing: true,
            created_status: (LotStatus::Planning, LotStatusDetails::Empty),
            required: true,
        };

        let mut revision = new_lot_revision("tmp-1");
        revision.value = None;
        match reconcile(&mut merge, &[], &[revision]) {
            Err(DomainError::Validation(msg)) => {
                assert!(msg.contains("tmp-1"));
                assert!(msg.contains("value"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_item_is_zeroed_not_dropped() {
        let source = SequencedIdSource::new();
        let mut continuity = IdContinuity::new(&source);
        let mut merge = ItemMerge {
            continuity: &mut continuity,
            required: false,
        };

        let stored = vec![Item {
            id: ItemId::new("i-1"),
            description: None,
            classification: tendra_tender::Classification {
                scheme: "CPV".to_string(),
                id: "45200000-9".to_string(),
                description: "construction work".to_string(),
            },
            quantity: 5.into(),
            unit: tendra_tender::Unit {
                code: "H87".to_string(),
                name: "piece".to_string(),
            },
            related_lot: LotId::new("L1"),
        }];

        let result = reconcile(&mut merge, &stored, &[]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].quantity, Decimal::ZERO);
        assert_eq!(result[0].related_lot, LotId::new("L1"));
    }

    #[test]
    fn document_update_unions_related_lots() {
        let mut merge = DocumentMerge {
            published_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            required: false,
        };

        let stored = vec![Document {
            id: tendra_core::DocumentId::new("D1"),
            document_type: DocumentType::BiddingDocuments,
            title: "old title".to_string(),
            description: Some("old description".to_string()),
            related_lots: [LotId::new("L1")].into_iter().collect(),
            date_published: Some(Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()),
        }];
        let received = vec![DocumentRevision {
            id: tendra_core::DocumentId::new("D1"),
            document_type: None,
            title: Some("new title".to_string()),
            description: None,
            related_lots: vec![LotId::new("L2")],
        }];

        let result = reconcile(&mut merge, &stored, &received).unwrap();
        assert_eq!(result[0].title, "new title");
        assert_eq!(result[0].description.as_deref(), Some("old description"));
        let related: Vec<_> = result[0].related_lots.iter().cloned().collect();
        assert_eq!(related, vec![LotId::new("L1"), LotId::new("L2")]);
        assert_eq!(
            result[0].date_published,
            Some(Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn auction_detail_of_cancelled_lot_is_dropped() {
        let active: HashSet<LotId> = [LotId::new("L1")].into_iter().collect();
        let mut merge = AuctionMerge {
            active_lot_ids: &active,
        };

        let stored = vec![
            AuctionLotDetail {
                related_lot: LotId::new("L1"),
                start_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
                bid_step: None,
            },
            AuctionLotDetail {
                related_lot: LotId::new("L2"),
                start_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
                bid_step: None,
            },
        ];

        let result = reconcile(&mut merge, &stored, &[]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].related_lot, LotId::new("L1"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a revision containing only already-known lot ids never
        /// mints a permanent id.
        #[test]
        fn known_ids_mint_nothing(count in 1usize..8) {
            let stored: Vec<Lot> = (0..count)
                .map(|i| stored_lot(&format!("L{i}"), LotStatus::Active))
                .collect();
            let received: Vec<LotRevision> = (0..count)
                .map(|i| update_only_revision(&format!("L{i}")))
                .collect();

            let source = SequencedIdSource::new();
            let mut continuity = IdContinuity::new(&source);
            let mut merge = LotMerge {
                continuity: &mut continuity,
                editable: &[LotStatus::Active],
                cancel_missing: true,
                created_status: (LotStatus::Active, LotStatusDetails::Empty),
                required: true,
            };
            let result = reconcile(&mut merge, &stored, &received).unwrap();

            prop_assert_eq!(result.len(), count);
            prop_assert_eq!(continuity.minted(), 0);
        }

        /// Property: N unseen temporary lot ids produce exactly N freshly
        /// minted permanent ids, all distinct from the temporaries.
        #[test]
        fn unseen_ids_mint_exactly_n(count in 1usize..8) {
            let received: Vec<LotRevision> = (0..count)
                .map(|i| new_lot_revision(&format!("tmp-{i}")))
                .collect();

            let source = SequencedIdSource::new();
            let mut continuity = IdContinuity::new(&source);
            let mut merge = LotMerge {
                continuity: &mut continuity,
                editable: &[LotStatus::Active],
                cancel_missing: true,
                created_status: (LotStatus::Active, LotStatusDetails::Empty),
                required: true,
            };
            let result = reconcile(&mut merge, &[], &received).unwrap();

            prop_assert_eq!(result.len(), count);
            prop_assert_eq!(continuity.minted(), count);
            for lot in &result {
                prop_assert!(!lot.id.as_str().starts_with("tmp-"));
            }
        }
    }
}
