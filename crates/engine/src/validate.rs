//! Cross-entity validation battery.
//!
//! Runs after all collections are individually reconciled and before the
//! aggregate is accepted, in a fixed order: key uniqueness, referential
//! closure, lot coverage, currency consistency, monetary ceiling, period
//! consistency. The first failing check aborts the whole pass.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use tendra_core::{DomainError, DomainResult, LotId};
use tendra_tender::{BudgetContext, Tender};

/// Inputs the validator needs beyond the aggregate itself.
pub struct ValidationContext<'a> {
    pub budget: &'a BudgetContext,
    /// Committed ceiling: the previously accepted tender value, or the
    /// budget ceiling on first creation.
    pub ceiling: Decimal,
    /// Lot contract periods must start strictly after this instant.
    pub reference_instant: DateTime<Utc>,
    pub require_coverage: bool,
}

/// Run the full battery over a reconciled aggregate.
pub fn validate_aggregate(tender: &Tender, ctx: &ValidationContext<'_>) -> DomainResult<()> {
    check_unique_keys(tender)?;
    check_referential_closure(tender)?;
    if ctx.require_coverage {
        check_lot_coverage(tender)?;
    }
    check_currencies(tender, ctx)?;
    check_ceiling(tender, ctx)?;
    check_periods(tender, ctx)?;
    Ok(())
}

fn unique<I>(collection: &'static str, keys: I) -> DomainResult<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    for key in keys {
        let key = key.as_ref().to_string();
        if !seen.insert(key.clone()) {
            return Err(DomainError::duplicate_id(collection, key));
        }
    }
    Ok(())
}

fn check_unique_keys(tender: &Tender) -> DomainResult<()> {
    unique("lots", tender.lots().iter().map(|l| l.id.as_str()))?;
    unique("items", tender.items().iter().map(|i| i.id.as_str()))?;
    unique("documents", tender.documents().iter().map(|d| d.id.as_str()))?;
    unique(
        "auction details",
        tender.auction_details().iter().map(|a| a.related_lot.as_str()),
    )?;
    unique(
        "persons",
        tender.procuring_entity().persons.iter().map(|p| p.id.as_str()),
    )?;
    for person in &tender.procuring_entity().persons {
        unique(
            "business functions",
            person.business_functions.iter().map(|bf| bf.id.as_str()),
        )?;
        for function in &person.business_functions {
            unique(
                "business function documents",
                function.documents.iter().map(|d| d.id.as_str()),
            )?;
        }
    }
    Ok(())
}

fn check_referential_closure(tender: &Tender) -> DomainResult<()> {
    let known = tender.lot_ids();
    let active: HashSet<&LotId> = tender.active_lots().map(|l| &l.id).collect();

    for item in tender.items() {
        if !known.contains(&item.related_lot) {
            return Err(DomainError::broken_reference(
                format!("item {}", item.id),
                "relatedLot",
                item.related_lot.as_str(),
            ));
        }
    }
    for document in tender.documents() {
        for related in &document.related_lots {
            if !known.contains(related) {
                return Err(DomainError::broken_reference(
                    format!("document {}", document.id),
                    "relatedLots",
                    related.as_str(),
                ));
            }
        }
    }
    // Auction details must point at lots that are still active; a detail
    // for a cancelled lot is unreferencable.
    for detail in tender.auction_details() {
        if !active.contains(&detail.related_lot) {
            return Err(DomainError::broken_reference(
                format!("auction detail for lot {}", detail.related_lot),
                "relatedLot",
                detail.related_lot.as_str(),
            ));
        }
    }
    Ok(())
}

fn check_lot_coverage(tender: &Tender) -> DomainResult<()> {
    let referenced: HashSet<&LotId> = tender.items().iter().map(|i| &i.related_lot).collect();
    for lot in tender.lots() {
        if !referenced.contains(&lot.id) {
            return Err(DomainError::UncoveredLot {
                lot_id: lot.id.to_string(),
            });
        }
    }
    Ok(())
}

fn check_currencies(tender: &Tender, ctx: &ValidationContext<'_>) -> DomainResult<()> {
    let expected = &ctx.budget.currency;
    for lot in tender.active_lots() {
        if lot.value.currency() != expected {
            return Err(DomainError::CurrencyMismatch {
                entity: format!("lot {}", lot.id),
                expected: expected.to_string(),
                found: lot.value.currency().to_string(),
            });
        }
    }
    if let Some(value) = tender.value() {
        if value.currency() != expected {
            return Err(DomainError::CurrencyMismatch {
                entity: "tender value".to_string(),
                expected: expected.to_string(),
                found: value.currency().to_string(),
            });
        }
    }
    Ok(())
}

fn check_ceiling(tender: &Tender, ctx: &ValidationContext<'_>) -> DomainResult<()> {
    let mut total = Decimal::ZERO;
    for lot in tender.active_lots() {
        total = total
            .checked_add(lot.value.amount())
            .ok_or_else(|| DomainError::validation("monetary amount overflow"))?;
    }
    let total = total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if total > ctx.ceiling {
        return Err(DomainError::CeilingExceeded {
            total,
            ceiling: ctx.ceiling,
        });
    }
    Ok(())
}

fn check_periods(tender: &Tender, ctx: &ValidationContext<'_>) -> DomainResult<()> {
    let mut derived: Option<(DateTime<Utc>, DateTime<Utc>)> = None;

    for lot in tender.active_lots() {
        let period = &lot.contract_period;
        if !period.is_well_formed() {
            return Err(DomainError::invalid_period(
                format!("lot {}", lot.id),
                "contract period start is not before its end",
            ));
        }
        if period.start() <= ctx.reference_instant {
            return Err(DomainError::invalid_period(
                format!("lot {}", lot.id),
                format!(
                    "contract period must start after {}",
                    ctx.reference_instant.to_rfc3339()
                ),
            ));
        }
        derived = Some(match derived {
            None => (period.start(), period.end()),
            Some((start, end)) => (start.min(period.start()), end.max(period.end())),
        });
    }

    if let Some((start, end)) = derived {
        for breakdown in &ctx.budget.breakdowns {
            let overlaps =
                start <= breakdown.period.end() && end >= breakdown.period.start();
            if !overlaps {
                return Err(DomainError::invalid_period(
                    "tender contract period",
                    format!("does not overlap budget breakdown {}", breakdown.id),
                ));
            }
        }
    }
    Ok(())
}
