//! Collaborator seams for persistence, the employee directory and
//! attendance proration.
//!
//! The engine never talks to a concrete database or HR system directly;
//! everything goes through the traits in this module, and every query is
//! scoped by tenant identifier. The in-memory implementations back the API
//! wiring, the tests and the benchmarks.

mod memory;

pub use memory::{FixedAttendance, MemoryDirectory, MemoryStore};

use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{Payrun, Payslip, Period, ProrationInput, WageConfiguration};

/// An active employee as seen by the payrun controller.
///
/// Only the fields the engine needs: identity plus the two optional links
/// whose absence is reported as a non-fatal compute warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeProfile {
    /// Caller-owned employee identifier.
    pub id: String,
    /// Payout destination, when one is on file.
    pub bank_account: Option<String>,
    /// Reporting manager, when one is assigned.
    pub manager_id: Option<String>,
}

/// Tenant/employee directory collaborator.
pub trait EmployeeDirectory: Send + Sync {
    /// Lists the active employees of a tenant.
    fn list_active_employees(&self, tenant_id: &str) -> EngineResult<Vec<EmployeeProfile>>;
}

/// Attendance proration collaborator.
pub trait AttendanceProvider: Send + Sync {
    /// Returns the proration figures for one employee and period.
    fn payable_days(
        &self,
        tenant_id: &str,
        employee_id: &str,
        period: Period,
    ) -> EngineResult<ProrationInput>;
}

/// Tenant-scoped persistence for wage configurations, payruns and payslips.
pub trait PayrollStore: Send + Sync {
    /// Stores a new wage configuration version.
    fn insert_wage_configuration(&self, config: WageConfiguration) -> EngineResult<()>;

    /// Returns the authoritative (latest by creation time) wage
    /// configuration for an employee, if any.
    fn latest_wage_configuration(
        &self,
        tenant_id: &str,
        employee_id: &str,
    ) -> EngineResult<Option<WageConfiguration>>;

    /// Stores a new payrun, atomically rejecting it with
    /// [`EngineError::PayrunExists`] when a non-cancelled payrun already
    /// covers the same tenant and period.
    ///
    /// The check and the insert happen under one store-level critical
    /// section so two overlapping creations cannot both succeed.
    ///
    /// [`EngineError::PayrunExists`]: crate::error::EngineError::PayrunExists
    fn insert_payrun(&self, payrun: Payrun) -> EngineResult<()>;

    /// Overwrites an existing payrun.
    fn update_payrun(&self, payrun: &Payrun) -> EngineResult<()>;

    /// Fetches a payrun by id within a tenant.
    fn get_payrun(&self, tenant_id: &str, payrun_id: Uuid) -> EngineResult<Option<Payrun>>;

    /// Finds the non-cancelled payrun covering a tenant's period, if any.
    fn find_active_payrun(&self, tenant_id: &str, period: Period)
    -> EngineResult<Option<Payrun>>;

    /// Inserts or overwrites a payslip by id.
    fn upsert_payslip(&self, payslip: Payslip) -> EngineResult<()>;

    /// Fetches a payslip by id within a tenant.
    fn get_payslip(&self, tenant_id: &str, payslip_id: Uuid) -> EngineResult<Option<Payslip>>;

    /// Fetches an employee's payslip within one payrun, if already written.
    fn find_payslip(
        &self,
        tenant_id: &str,
        payrun_id: Uuid,
        employee_id: &str,
    ) -> EngineResult<Option<Payslip>>;

    /// Fetches all payslips belonging to one payrun.
    fn payslips_for_payrun(&self, tenant_id: &str, payrun_id: Uuid) -> EngineResult<Vec<Payslip>>;

    /// Fetches all of an employee's payslips whose period falls in a
    /// calendar year, regardless of status.
    fn payslips_for_year(
        &self,
        tenant_id: &str,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<Vec<Payslip>>;
}
