//! In-memory implementations of the collaborator traits.
//!
//! These back the tests, the benchmarks and single-process deployments.
//! A production deployment would implement [`PayrollStore`] over a real
//! database; the lifecycle controller does not care which.

use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Payrun, Payslip, Period, ProrationInput, WageConfiguration};

use super::{AttendanceProvider, EmployeeDirectory, EmployeeProfile, PayrollStore};

fn lock_poisoned() -> EngineError {
    EngineError::Internal {
        message: "store lock poisoned".to_string(),
    }
}

#[derive(Default)]
struct Inner {
    configs: Vec<WageConfiguration>,
    payruns: HashMap<Uuid, Payrun>,
    payslips: HashMap<Uuid, Payslip>,
}

/// In-memory [`PayrollStore`] backed by a read-write lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PayrollStore for MemoryStore {
    fn insert_wage_configuration(&self, config: WageConfiguration) -> EngineResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        inner.configs.push(config);
        Ok(())
    }

    fn latest_wage_configuration(
        &self,
        tenant_id: &str,
        employee_id: &str,
    ) -> EngineResult<Option<WageConfiguration>> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(inner
            .configs
            .iter()
            .filter(|c| c.tenant_id == tenant_id && c.employee_id == employee_id)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    fn insert_payrun(&self, payrun: Payrun) -> EngineResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        let duplicate = inner.payruns.values().any(|p| {
            p.tenant_id == payrun.tenant_id
                && p.period == payrun.period
                && p.status != crate::models::PayrunStatus::Cancelled
        });
        if duplicate {
            return Err(EngineError::PayrunExists {
                tenant_id: payrun.tenant_id,
                period: payrun.period,
            });
        }
        inner.payruns.insert(payrun.id, payrun);
        Ok(())
    }

    fn update_payrun(&self, payrun: &Payrun) -> EngineResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        if !inner.payruns.contains_key(&payrun.id) {
            return Err(EngineError::PayrunNotFound {
                payrun_id: payrun.id,
            });
        }
        inner.payruns.insert(payrun.id, payrun.clone());
        Ok(())
    }

    fn get_payrun(&self, tenant_id: &str, payrun_id: Uuid) -> EngineResult<Option<Payrun>> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(inner
            .payruns
            .get(&payrun_id)
            .filter(|p| p.tenant_id == tenant_id)
            .cloned())
    }

    fn find_active_payrun(
        &self,
        tenant_id: &str,
        period: Period,
    ) -> EngineResult<Option<Payrun>> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(inner
            .payruns
            .values()
            .find(|p| {
                p.tenant_id == tenant_id
                    && p.period == period
                    && p.status != crate::models::PayrunStatus::Cancelled
            })
            .cloned())
    }

    fn upsert_payslip(&self, payslip: Payslip) -> EngineResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        inner.payslips.insert(payslip.id, payslip);
        Ok(())
    }

    fn get_payslip(&self, tenant_id: &str, payslip_id: Uuid) -> EngineResult<Option<Payslip>> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(inner
            .payslips
            .get(&payslip_id)
            .filter(|p| p.tenant_id == tenant_id)
            .cloned())
    }

    fn find_payslip(
        &self,
        tenant_id: &str,
        payrun_id: Uuid,
        employee_id: &str,
    ) -> EngineResult<Option<Payslip>> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(inner
            .payslips
            .values()
            .find(|p| {
                p.tenant_id == tenant_id
                    && p.payrun_id == payrun_id
                    && p.employee_id == employee_id
            })
            .cloned())
    }

    fn payslips_for_payrun(&self, tenant_id: &str, payrun_id: Uuid) -> EngineResult<Vec<Payslip>> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(inner
            .payslips
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.payrun_id == payrun_id)
            .cloned()
            .collect())
    }

    fn payslips_for_year(
        &self,
        tenant_id: &str,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<Vec<Payslip>> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(inner
            .payslips
            .values()
            .filter(|p| {
                p.tenant_id == tenant_id
                    && p.employee_id == employee_id
                    && p.period.year() == year
            })
            .cloned()
            .collect())
    }
}

/// In-memory [`EmployeeDirectory`].
#[derive(Default)]
pub struct MemoryDirectory {
    employees: RwLock<HashMap<String, Vec<EmployeeProfile>>>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active employee under a tenant.
    pub fn add_employee(&self, tenant_id: &str, profile: EmployeeProfile) {
        let mut employees = self
            .employees
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        employees
            .entry(tenant_id.to_string())
            .or_default()
            .push(profile);
    }
}

impl EmployeeDirectory for MemoryDirectory {
    fn list_active_employees(&self, tenant_id: &str) -> EngineResult<Vec<EmployeeProfile>> {
        let employees = self.employees.read().map_err(|_| lock_poisoned())?;
        Ok(employees.get(tenant_id).cloned().unwrap_or_default())
    }
}

/// [`AttendanceProvider`] returning a full month of payable days unless an
/// override is registered for the employee.
pub struct FixedAttendance {
    default_working_days: Decimal,
    overrides: RwLock<HashMap<(String, String), ProrationInput>>,
}

impl FixedAttendance {
    /// Creates a provider that reports every employee at `working_days`
    /// payable days out of `working_days`.
    pub fn new(working_days: Decimal) -> Self {
        Self {
            default_working_days: working_days,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Overrides the proration figures for one employee.
    pub fn set(&self, tenant_id: &str, employee_id: &str, proration: ProrationInput) {
        let mut overrides = self
            .overrides
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        overrides.insert(
            (tenant_id.to_string(), employee_id.to_string()),
            proration,
        );
    }
}

impl AttendanceProvider for FixedAttendance {
    fn payable_days(
        &self,
        tenant_id: &str,
        employee_id: &str,
        _period: Period,
    ) -> EngineResult<ProrationInput> {
        let overrides = self.overrides.read().map_err(|_| lock_poisoned())?;
        Ok(overrides
            .get(&(tenant_id.to_string(), employee_id.to_string()))
            .cloned()
            .unwrap_or(ProrationInput {
                payable_days: self.default_working_days,
                total_working_days: self.default_working_days,
                attendance_days_amount: Decimal::ZERO,
                paid_leave_days_amount: Decimal::ZERO,
            }))
    }
}
