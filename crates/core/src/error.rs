//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Coarse classification of a [`DomainError`], used by boundary layers to
/// translate failures into caller-visible codes without inspecting every
/// variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client-caused, deterministic; never retried.
    Validation,
    /// Lost an optimistic-concurrency race; the caller may retry.
    Conflict,
    /// Internal failure (storage unreachable, corrupt payload); not
    /// client-attributable.
    Incident,
}

/// Domain-level error.
///
/// Every validation variant carries enough detail to identify the offending
/// entity id and field. Infrastructure failures are folded into `Incident`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed or missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Two entities in the same collection share a key.
    #[error("duplicate id in {collection}: {id}")]
    DuplicateId { collection: &'static str, id: String },

    /// A cross-reference does not resolve within the aggregate.
    #[error("{entity}: {field} references unknown lot {value}")]
    BrokenReference {
        entity: String,
        field: &'static str,
        value: String,
    },

    /// A previously non-empty collection was submitted empty where the
    /// operation requires it to stay populated.
    #[error("required collection {collection} must not be emptied")]
    MissingRequiredCollection { collection: &'static str },

    /// A lot has no item relating to it.
    #[error("lot {lot_id} has no related item")]
    UncoveredLot { lot_id: String },

    /// Currencies disagree between tender value, lot values or budget.
    #[error("currency mismatch on {entity}: expected {expected}, found {found}")]
    CurrencyMismatch {
        entity: String,
        expected: String,
        found: String,
    },

    /// Sum of active lot values exceeds the committed ceiling.
    #[error("tender value {total} exceeds ceiling {ceiling}")]
    CeilingExceeded { total: Decimal, ceiling: Decimal },

    /// A contract or tender period is inconsistent.
    #[error("invalid period on {entity}: {detail}")]
    InvalidPeriod { entity: String, detail: String },

    /// The requested status change is not legal from the current state.
    #[error("illegal status transition for {entity}: {from} -> {to}")]
    InvalidStatusTransition {
        entity: String,
        from: String,
        to: String,
    },

    /// A revision tried to edit a lot whose status freezes it.
    #[error("lot {lot_id} is not editable in status {status}")]
    InvalidLotStatus { lot_id: String, status: String },

    /// An item quantity must stay strictly positive while the item is live.
    #[error("quantity must be positive for item {item_id}")]
    NonPositiveQuantity { item_id: String },

    /// Derivation requires at least one active lot.
    #[error("no active lots to derive tender value from")]
    NoActiveLots,

    /// A referenced aggregate or sub-entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Optimistic-concurrency failure (stale version marker).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure surfaced through the domain boundary.
    #[error("incident: {0}")]
    Incident(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate_id(collection: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            collection,
            id: id.into(),
        }
    }

    pub fn broken_reference(
        entity: impl Into<String>,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::BrokenReference {
            entity: entity.into(),
            field,
            value: value.into(),
        }
    }

    pub fn invalid_period(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidPeriod {
            entity: entity.into(),
            detail: detail.into(),
        }
    }

    pub fn transition(
        entity: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::InvalidStatusTransition {
            entity: entity.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn incident(msg: impl Into<String>) -> Self {
        Self::Incident(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Classify this error for boundary translation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Incident(_) => ErrorKind::Incident,
            _ => ErrorKind::Validation,
        }
    }
}
