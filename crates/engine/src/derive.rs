//! Aggregate value and contract-period derivation.
//!
//! Pure functions of the reconciled, still-active lot set; recomputed on
//! every pass rather than incrementally updated, so the derived fields can
//! never drift from the collections.

use tendra_core::{DomainError, DomainResult, Money, Period};
use tendra_tender::Lot;

/// Sum of the active lots' values, rounded half-up to two decimal places.
///
/// Fails when no lot is active or when active-lot currencies disagree.
pub fn derive_value(lots: &[Lot]) -> DomainResult<Money> {
    let mut active = lots.iter().filter(|lot| lot.is_active());
    let first = active.next().ok_or(DomainError::NoActiveLots)?;

    let mut total = first.value.clone();
    for lot in active {
        if lot.value.currency() != total.currency() {
            return Err(DomainError::CurrencyMismatch {
                entity: format!("lot {}", lot.id),
                expected: total.currency().to_string(),
                found: lot.value.currency().to_string(),
            });
        }
        total = total.add(&lot.value)?;
    }
    Ok(total.rounded())
}

/// Earliest active start to latest active end.
pub fn derive_contract_period(lots: &[Lot]) -> DomainResult<Period> {
    let mut active = lots.iter().filter(|lot| lot.is_active());
    let first = active.next().ok_or(DomainError::NoActiveLots)?;

    let mut start = first.contract_period.start();
    let mut end = first.contract_period.end();
    for lot in active {
        start = start.min(lot.contract_period.start());
        end = end.max(lot.contract_period.end());
    }
    Period::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use tendra_core::{Currency, LotId};
    use tendra_tender::{LotStatus, LotStatusDetails};

    fn eur() -> Currency {
        Currency::new("EUR").unwrap()
    }

    fn date(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 0, 0, 0).unwrap()
    }

    fn lot(id: &str, amount: Decimal, status: LotStatus, from: u32, to: u32) -> Lot {
        Lot {
            id: LotId::new(id),
            title: format!("lot {id}"),
            description: None,
            status,
            status_details: LotStatusDetails::Empty,
            value: Money::new(amount, eur()),
            contract_period: Period::new(date(from, 1), date(to, 1)).unwrap(),
            place_of_performance: None,
        }
    }

    #[test]
    fn sums_only_active_lots() {
        let lots = vec![
            lot("L1", 1000.into(), LotStatus::Active, 2, 6),
            lot("L2", 2000.into(), LotStatus::Cancelled, 2, 6),
            lot("L3", 500.into(), LotStatus::Active, 2, 6),
        ];
        let value = derive_value(&lots).unwrap();
        assert_eq!(value.amount(), Decimal::from(1500));
        assert_eq!(value.currency(), &eur());
    }

    #[test]
    fn rounds_half_up_to_two_decimals() {
        let lots = vec![
            lot("L1", "0.125".parse().unwrap(), LotStatus::Active, 2, 6),
            lot("L2", "0.12".parse().unwrap(), LotStatus::Active, 2, 6),
        ];
        let value = derive_value(&lots).unwrap();
        assert_eq!(value.amount(), "0.25".parse::<Decimal>().unwrap());
    }

    #[test]
    fn empty_active_set_fails() {
        let lots = vec![lot("L1", 1000.into(), LotStatus::Cancelled, 2, 6)];
        assert_eq!(derive_value(&lots), Err(DomainError::NoActiveLots));
        assert_eq!(derive_contract_period(&lots), Err(DomainError::NoActiveLots));
    }

    #[test]
    fn currency_disagreement_names_the_lot() {
        let mut second = lot("L2", 100.into(), LotStatus::Active, 2, 6);
        second.value = Money::new(100.into(), Currency::new("USD").unwrap());
        let lots = vec![lot("L1", 100.into(), LotStatus::Active, 2, 6), second];
        match derive_value(&lots) {
            Err(DomainError::CurrencyMismatch { entity, .. }) => assert_eq!(entity, "lot L2"),
            other => panic!("expected currency mismatch, got {other:?}"),
        }
    }

    #[test]
    fn period_spans_min_start_to_max_end() {
        let lots = vec![
            lot("L1", 100.into(), LotStatus::Active, 3, 5),
            lot("L2", 100.into(), LotStatus::Active, 2, 4),
            lot("L3", 100.into(), LotStatus::Cancelled, 1, 12),
        ];
        let period = derive_contract_period(&lots).unwrap();
        assert_eq!(period.start(), date(2, 1));
        assert_eq!(period.end(), date(5, 1));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the derived value equals the plain sum of active-lot
        /// amounts (no drift, no double counting), in the shared currency.
        #[test]
        fn derived_value_equals_sum_of_active_amounts(
            amounts in prop::collection::vec(1i64..1_000_000i64, 1..12),
            cancelled in prop::collection::vec(any::<bool>(), 12)
        ) {
            let lots: Vec<Lot> = amounts
                .iter()
                .zip(cancelled.iter())
                .enumerate()
                .map(|(i, (amount, cancel))| {
                    let status = if *cancel { LotStatus::Cancelled } else { LotStatus::Active };
                    lot(&format!("L{i}"), (*amount).into(), status, 2, 6)
                })
                .collect();

            let expected: i64 = amounts
                .iter()
                .zip(cancelled.iter())
                .filter(|(_, cancel)| !**cancel)
                .map(|(amount, _)| *amount)
                .sum();

            match derive_value(&lots) {
                Ok(value) => {
                    prop_assert_eq!(value.amount(), Decimal::from(expected));
                    prop_assert_eq!(value.currency(), &eur());
                }
                Err(DomainError::NoActiveLots) => prop_assert_eq!(expected, 0),
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }
    }
}
