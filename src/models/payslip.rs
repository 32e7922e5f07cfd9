//! Payslip model and proration input.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ComputedBreakdown, PayrunStatus, Period};

/// Attendance-derived proration figures for one employee and period.
///
/// Supplied by the attendance collaborator; the engine treats these as
/// opaque inputs and stores them on the payslip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationInput {
    /// Days the employee is paid for in the period.
    pub payable_days: Decimal,
    /// Total working days in the period.
    pub total_working_days: Decimal,
    /// Amount attributable to attended days.
    pub attendance_days_amount: Decimal,
    /// Amount attributable to paid leave days.
    pub paid_leave_days_amount: Decimal,
}

/// One employee's snapshot within a payrun.
///
/// Overwritten freely during `compute`/`recompute`; immutable once the
/// parent payrun reaches `done`. The `status` field mirrors the parent
/// payrun's status on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier.
    pub id: Uuid,
    /// The parent payrun.
    pub payrun_id: Uuid,
    /// The tenant this payslip belongs to.
    pub tenant_id: String,
    /// The employee this payslip is for.
    pub employee_id: String,
    /// The period this payslip covers (same as the parent payrun's).
    pub period: Period,
    /// The resolved pay breakdown.
    pub breakdown: ComputedBreakdown,
    /// Attendance-derived proration figures.
    pub proration: ProrationInput,
    /// Denormalized copy of the parent payrun's status.
    pub status: PayrunStatus,
    /// When this payslip was last written.
    pub computed_at: DateTime<Utc>,
}
