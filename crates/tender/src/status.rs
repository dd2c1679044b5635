//! Status and status-details enums for the tender and its lots.
//!
//! Status-details is an orthogonal sub-state layered on top of status;
//! terminal statuses are sinks.

use serde::{Deserialize, Serialize};

/// Tender status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenderStatus {
    Planning,
    Planned,
    Active,
    Suspended,
    Unsuccessful,
    Cancelled,
    Complete,
}

impl TenderStatus {
    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TenderStatus::Unsuccessful | TenderStatus::Cancelled | TenderStatus::Complete
        )
    }
}

impl core::fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            TenderStatus::Planning => "planning",
            TenderStatus::Planned => "planned",
            TenderStatus::Active => "active",
            TenderStatus::Suspended => "suspended",
            TenderStatus::Unsuccessful => "unsuccessful",
            TenderStatus::Cancelled => "cancelled",
            TenderStatus::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Tender status-details sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenderStatusDetails {
    Empty,
    Suspended,
    Awarded,
    Cancelled,
}

impl core::fmt::Display for TenderStatusDetails {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            TenderStatusDetails::Empty => "empty",
            TenderStatusDetails::Suspended => "suspended",
            TenderStatusDetails::Awarded => "awarded",
            TenderStatusDetails::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Lot status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotStatus {
    Planning,
    Planned,
    Active,
    Cancelled,
    Unsuccessful,
    Complete,
}

impl LotStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LotStatus::Cancelled | LotStatus::Unsuccessful | LotStatus::Complete
        )
    }

    /// Active lots participate in value/period derivation; a lot in a
    /// cancellation/removal state does not.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            LotStatus::Planning | LotStatus::Planned | LotStatus::Active
        )
    }
}

impl core::fmt::Display for LotStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            LotStatus::Planning => "planning",
            LotStatus::Planned => "planned",
            LotStatus::Active => "active",
            LotStatus::Cancelled => "cancelled",
            LotStatus::Unsuccessful => "unsuccessful",
            LotStatus::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Lot status-details sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotStatusDetails {
    Empty,
    Awarded,
    Unsuccessful,
}

impl core::fmt::Display for LotStatusDetails {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            LotStatusDetails::Empty => "empty",
            LotStatusDetails::Awarded => "awarded",
            LotStatusDetails::Unsuccessful => "unsuccessful",
        };
        f.write_str(s)
    }
}
