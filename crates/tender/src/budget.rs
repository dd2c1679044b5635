//! Externally supplied budget figures the reconciled aggregate is checked
//! against. The engine never mutates these; they arrive with the operation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tendra_core::{Currency, Period};

/// One budget allocation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub id: String,
    pub period: Period,
    pub amount: Option<Decimal>,
}

/// Budget context for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetContext {
    /// Currency every monetary figure in the aggregate must match.
    pub currency: Currency,
    /// Ceiling used on first creation, before the tender commits its own.
    pub ceiling: Decimal,
    /// The derived contract period must overlap every breakdown period.
    pub breakdowns: Vec<BudgetBreakdown>,
}
