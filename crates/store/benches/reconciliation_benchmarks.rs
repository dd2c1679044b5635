use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{DateTime, TimeZone, Utc};
use tendra_core::{
    Currency, ItemId, LotId, Money, Period, ProcessId, SequencedIdSource, Stage,
};
use tendra_engine::{OperationContext, OperationKind, UpdateOrchestrator};
use tendra_parties::{Address, Identifier, ProcuringEntity};
use tendra_store::InMemoryDocumentStore;
use tendra_tender::{
    BudgetContext, Classification, Item, ItemRevision, Lot, LotRevision, LotStatus,
    LotStatusDetails, Tender, TenderRef, TenderRevision, TenderStatus, Unit,
};

fn date(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, 0, 0, 0).unwrap()
}

fn eur() -> Currency {
    Currency::new("EUR").unwrap()
}

fn procuring_entity() -> ProcuringEntity {
    ProcuringEntity {
        name: "city hall".to_string(),
        identifier: Identifier {
            scheme: "MD-IDNO".to_string(),
            id: "100500".to_string(),
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
    }
}

fn lot(id: &str) -> Lot {
    Lot {
        id: LotId::new(id),
        title: format!("lot {id}"),
        description: None,
        status: LotStatus::Active,
        status_details: LotStatusDetails::Empty,
        value: Money::new(1000.into(), eur()),
        contract_period: Period::new(date(2, 1), date(6, 1)).unwrap(),
        place_of_performance: None,
    }
}

fn item(id: &str, related: &str) -> Item {
    Item {
        id: ItemId::new(id),
        description: None,
        classification: Classification {
            scheme: "CPV".to_string(),
            id: "45200000-9".to_string(),
            description: "construction work".to_string(),
        },
        quantity: 1.into(),
        unit: Unit {
            code: "H87".to_string(),
            name: "piece".to_string(),
        },
        related_lot: LotId::new(related),
    }
}

fn seeded_store(lot_count: usize) -> InMemoryDocumentStore {
    let mut tender = Tender::new(
        TenderRef::new(ProcessId::new("ocds-1"), Stage::new("tender")),
        "works".to_string(),
        TenderStatus::Active,
        procuring_entity(),
    );
    tender.set_lots((0..lot_count).map(|i| lot(&format!("L{i}"))).collect());
    tender.set_items(
        (0..lot_count)
            .map(|i| item(&format!("i-{i}"), &format!("L{i}")))
            .collect(),
    );
    let store = InMemoryDocumentStore::new();
    store.seed(&tender, 1).unwrap();
    store
}

fn update_revision(lot_count: usize) -> TenderRevision {
    TenderRevision {
        lots: (0..lot_count)
            .map(|i| LotRevision {
                id: LotId::new(format!("L{i}")),
                title: None,
                description: None,
                value: Some(Money::new(1500.into(), eur())),
                contract_period: None,
                place_of_performance: None,
            })
            .collect(),
        items: (0..lot_count)
            .map(|i| ItemRevision {
                id: ItemId::new(format!("i-{i}")),
                description: None,
                classification: None,
                quantity: Some(2.into()),
                unit: None,
                related_lot: None,
            })
            .collect(),
        ..TenderRevision::default()
    }
}

fn context() -> OperationContext {
    OperationContext {
        process: ProcessId::new("ocds-1"),
        stage: Stage::new("tender"),
        previous_stage: None,
        owner: "owner-1".to_string(),
        access_token: "token-1".to_string(),
        start_date: date(1, 10),
    }
}

fn budget() -> BudgetContext {
    BudgetContext {
        currency: eur(),
        ceiling: 100_000_000.into(),
        breakdowns: Vec::new(),
    }
}

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciliation_pass");

    for lot_count in [1usize, 10, 50, 200].iter() {
        group.throughput(Throughput::Elements(*lot_count as u64));
        group.bench_with_input(
            BenchmarkId::new("update_all_lots", lot_count),
            lot_count,
            |b, &count| {
                let store = seeded_store(count);
                let ids = SequencedIdSource::new();
                let orchestrator = UpdateOrchestrator::new(&store, &ids);
                let ctx = context();
                let budget = budget();
                let revision = update_revision(count);
                b.iter(|| {
                    orchestrator
                        .execute(
                            black_box(&ctx),
                            OperationKind::AmendTender,
                            &budget,
                            black_box(&revision),
                        )
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_full_pass);
criterion_main!(benches);
