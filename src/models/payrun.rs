//! Payrun model and lifecycle states.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Period;

/// The lifecycle state of a payrun.
///
/// Transitions: `draft → computed → validated → done`; `cancel` is
/// reachable from any non-terminal state. `done` and `cancelled` are
/// terminal: no further transitions, including recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrunStatus {
    /// Created, nothing computed yet.
    Draft,
    /// Payslips computed; may be recomputed or validated.
    Computed,
    /// Approved; awaiting finalization.
    Validated,
    /// Cancelled before finalization. Terminal; payslips kept for audit
    /// but no longer authoritative.
    Cancelled,
    /// Finalized. Terminal; payslips are frozen permanently.
    Done,
}

impl PayrunStatus {
    /// Whether `compute` may run from this state. Re-running while not yet
    /// validated is allowed (idempotent).
    pub fn can_compute(self) -> bool {
        matches!(self, PayrunStatus::Draft | PayrunStatus::Computed)
    }

    /// Whether `validate` may run from this state.
    pub fn can_validate(self) -> bool {
        self == PayrunStatus::Computed
    }

    /// Whether `finalize` may run from this state.
    pub fn can_finalize(self) -> bool {
        self == PayrunStatus::Validated
    }

    /// Whether `cancel` may run from this state.
    pub fn can_cancel(self) -> bool {
        !self.is_terminal()
    }

    /// Whether this state accepts no further transitions at all.
    pub fn is_terminal(self) -> bool {
        matches!(self, PayrunStatus::Done | PayrunStatus::Cancelled)
    }
}

impl fmt::Display for PayrunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PayrunStatus::Draft => "draft",
            PayrunStatus::Computed => "computed",
            PayrunStatus::Validated => "validated",
            PayrunStatus::Cancelled => "cancelled",
            PayrunStatus::Done => "done",
        };
        f.write_str(s)
    }
}

/// One payroll processing cycle for a tenant covering one period.
///
/// Created in `draft`, destroyed never; `done` and `cancelled` are soft
/// terminal states. Aggregate totals are owned exclusively by the lifecycle
/// controller and only change under the payrun's lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payrun {
    /// Unique identifier.
    pub id: Uuid,
    /// The tenant this payrun belongs to.
    pub tenant_id: String,
    /// The period this payrun covers.
    pub period: Period,
    /// Current lifecycle state.
    pub status: PayrunStatus,
    /// Number of employees covered by the last compute.
    pub employees_count: u32,
    /// Sum of gross monthly pay across all payslips.
    pub gross_total: Decimal,
    /// Sum of net salary across all payslips.
    pub net_total: Decimal,
    /// Who created the payrun.
    pub created_by: String,
    /// Who validated the payrun, once validated.
    pub validated_by: Option<String>,
    /// When the payrun was created.
    pub created_at: DateTime<Utc>,
    /// When the payrun last changed.
    pub updated_at: DateTime<Utc>,
    /// When the payrun was validated, once validated.
    pub validated_at: Option<DateTime<Utc>>,
}

impl Payrun {
    /// Creates a new payrun in `draft` for the given tenant and period.
    pub fn new(tenant_id: impl Into<String>, period: Period, created_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            period,
            status: PayrunStatus::Draft,
            employees_count: 0,
            gross_total: Decimal::ZERO,
            net_total: Decimal::ZERO,
            created_by: created_by.into(),
            validated_by: None,
            created_at: now,
            updated_at: now,
            validated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_allowed_from_draft_and_computed_only() {
        assert!(PayrunStatus::Draft.can_compute());
        assert!(PayrunStatus::Computed.can_compute());
        assert!(!PayrunStatus::Validated.can_compute());
        assert!(!PayrunStatus::Cancelled.can_compute());
        assert!(!PayrunStatus::Done.can_compute());
    }

    #[test]
    fn test_validate_allowed_from_computed_only() {
        assert!(PayrunStatus::Computed.can_validate());
        assert!(!PayrunStatus::Draft.can_validate());
        assert!(!PayrunStatus::Validated.can_validate());
        assert!(!PayrunStatus::Done.can_validate());
    }

    #[test]
    fn test_finalize_allowed_from_validated_only() {
        assert!(PayrunStatus::Validated.can_finalize());
        assert!(!PayrunStatus::Computed.can_finalize());
        assert!(!PayrunStatus::Done.can_finalize());
    }

    #[test]
    fn test_cancel_allowed_from_non_terminal_states() {
        assert!(PayrunStatus::Draft.can_cancel());
        assert!(PayrunStatus::Computed.can_cancel());
        assert!(PayrunStatus::Validated.can_cancel());
        assert!(!PayrunStatus::Cancelled.can_cancel());
        assert!(!PayrunStatus::Done.can_cancel());
    }

    #[test]
    fn test_terminal_states() {
        assert!(PayrunStatus::Done.is_terminal());
        assert!(PayrunStatus::Cancelled.is_terminal());
        assert!(!PayrunStatus::Draft.is_terminal());
        assert!(!PayrunStatus::Computed.is_terminal());
        assert!(!PayrunStatus::Validated.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PayrunStatus::Draft).unwrap(),
            "\"draft\""
        );
        assert_eq!(
            serde_json::to_string(&PayrunStatus::Done).unwrap(),
            "\"done\""
        );
    }

    #[test]
    fn test_new_payrun_starts_in_draft_with_zero_totals() {
        let payrun = Payrun::new("acme", Period::new(2026, 3).unwrap(), "admin");
        assert_eq!(payrun.status, PayrunStatus::Draft);
        assert_eq!(payrun.employees_count, 0);
        assert_eq!(payrun.gross_total, Decimal::ZERO);
        assert_eq!(payrun.net_total, Decimal::ZERO);
        assert!(payrun.validated_by.is_none());
        assert!(payrun.validated_at.is_none());
    }
}
