//! The payrun lifecycle controller.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Payrun, PayrunStatus, Payslip, Period, ResolveWarning};
use crate::resolver::resolve_configuration;
use crate::store::{AttendanceProvider, EmployeeDirectory, PayrollStore};

use super::locks::LockRegistry;

/// A non-fatal, per-employee condition observed during `compute`.
///
/// Warnings never abort the batch; they are returned alongside the result
/// so the caller can surface them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeWarning {
    /// The employee the warning concerns.
    pub employee_id: String,
    /// A stable machine-readable code.
    pub code: String,
    /// A human-readable description.
    pub message: String,
}

impl ComputeWarning {
    fn new(employee_id: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// The result of a `compute` call: the updated payrun plus the warnings
/// collected across the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeOutcome {
    /// The payrun after the transition to `computed`.
    pub payrun: Payrun,
    /// Per-employee warnings; empty on a fully clean run.
    pub warnings: Vec<ComputeWarning>,
}

/// Orchestrates payslip snapshotting across a tenant's employees and
/// enforces the payrun state machine.
///
/// All status and aggregate writes happen under the payrun's exclusive
/// lock, with the status re-read after acquisition so a transition that
/// raced a concurrent operation fails with an invalid-transition error
/// instead of blindly overwriting.
pub struct PayrunController {
    store: Arc<dyn PayrollStore>,
    directory: Arc<dyn EmployeeDirectory>,
    attendance: Arc<dyn AttendanceProvider>,
    locks: LockRegistry,
}

impl PayrunController {
    /// Creates a controller over the given collaborators.
    pub fn new(
        store: Arc<dyn PayrollStore>,
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceProvider>,
    ) -> Self {
        Self {
            store,
            directory,
            attendance,
            locks: LockRegistry::new(),
        }
    }

    /// Creates a payrun in `draft` for the tenant and period.
    ///
    /// Fails with [`EngineError::PayrunExists`] when a non-cancelled payrun
    /// already covers the period.
    pub fn create(
        &self,
        tenant_id: &str,
        period: Period,
        created_by: &str,
    ) -> EngineResult<Payrun> {
        let payrun = Payrun::new(tenant_id, period, created_by);
        // Uniqueness is enforced by the store's atomic insert: checking
        // here first would leave a window between the check and the
        // insert where a concurrent create could slip in.
        match self.store.insert_payrun(payrun.clone()) {
            Ok(()) => {
                info!(tenant_id, %period, payrun_id = %payrun.id, "Payrun created");
                Ok(payrun)
            }
            Err(err @ EngineError::PayrunExists { .. }) => {
                warn!(tenant_id, %period, "Rejected duplicate payrun creation");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Computes (or recomputes) payslips for every active employee of the
    /// tenant and transitions the payrun to `computed`.
    ///
    /// Valid from `draft` or `computed`. A single employee's failure is
    /// recorded as a warning and does not abort the batch. Status and
    /// aggregate totals are written together, at the end, so an abandoned
    /// call leaves the payrun either fully `computed` or in its prior
    /// state.
    pub async fn compute(&self, tenant_id: &str, payrun_id: Uuid) -> EngineResult<ComputeOutcome> {
        let _guard = self.locks.acquire(payrun_id).await;

        let mut payrun = self
            .store
            .get_payrun(tenant_id, payrun_id)?
            .ok_or(EngineError::PayrunNotFound { payrun_id })?;
        if !payrun.status.can_compute() {
            return Err(EngineError::InvalidTransition {
                payrun_id,
                current: payrun.status,
                action: "compute",
            });
        }

        let mut warnings = Vec::new();
        let mut employees_count: u32 = 0;
        let mut gross_total = Decimal::ZERO;
        let mut net_total = Decimal::ZERO;

        for employee in self.directory.list_active_employees(tenant_id)? {
            if employee.bank_account.is_none() {
                warnings.push(ComputeWarning::new(
                    &employee.id,
                    "missing_payout_destination",
                    "employee has no payout destination on file",
                ));
            }
            if employee.manager_id.is_none() {
                warnings.push(ComputeWarning::new(
                    &employee.id,
                    "missing_reporting_manager",
                    "employee has no reporting manager assigned",
                ));
            }

            let Some(config) = self
                .store
                .latest_wage_configuration(tenant_id, &employee.id)?
            else {
                warnings.push(ComputeWarning::new(
                    &employee.id,
                    "missing_wage_configuration",
                    "employee has no wage configuration and was skipped",
                ));
                continue;
            };

            let outcome = match resolve_configuration(&config) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(tenant_id, employee_id = %employee.id, error = %err, "Employee not computable");
                    warnings.push(ComputeWarning::new(
                        &employee.id,
                        "not_computable",
                        err.to_string(),
                    ));
                    continue;
                }
            };
            for resolve_warning in &outcome.warnings {
                let ResolveWarning::OverAllocated { excess } = resolve_warning;
                warn!(tenant_id, employee_id = %employee.id, %excess, "Components over-allocated");
                warnings.push(ComputeWarning::new(
                    &employee.id,
                    "over_allocated",
                    format!("components exceed the configured wage by {excess}"),
                ));
            }

            let proration = self
                .attendance
                .payable_days(tenant_id, &employee.id, payrun.period)?;

            // Overwrite in place when this employee already has a payslip
            // from an earlier compute of the same payrun.
            let payslip_id = self
                .store
                .find_payslip(tenant_id, payrun_id, &employee.id)?
                .map(|existing| existing.id)
                .unwrap_or_else(Uuid::new_v4);

            gross_total += outcome.breakdown.gross_monthly;
            net_total += outcome.breakdown.net_salary;
            employees_count += 1;

            self.store.upsert_payslip(Payslip {
                id: payslip_id,
                payrun_id,
                tenant_id: tenant_id.to_string(),
                employee_id: employee.id.clone(),
                period: payrun.period,
                breakdown: outcome.breakdown,
                proration,
                status: PayrunStatus::Computed,
                computed_at: Utc::now(),
            })?;
        }

        payrun.status = PayrunStatus::Computed;
        payrun.employees_count = employees_count;
        payrun.gross_total = gross_total;
        payrun.net_total = net_total;
        payrun.updated_at = Utc::now();
        self.store.update_payrun(&payrun)?;

        info!(
            tenant_id,
            payrun_id = %payrun.id,
            employees_count,
            %gross_total,
            %net_total,
            warnings = warnings.len(),
            "Payrun computed"
        );
        Ok(ComputeOutcome { payrun, warnings })
    }

    /// Approves a computed payrun. No recomputation occurs here.
    pub async fn validate(
        &self,
        tenant_id: &str,
        payrun_id: Uuid,
        validated_by: &str,
    ) -> EngineResult<Payrun> {
        let _guard = self.locks.acquire(payrun_id).await;

        let mut payrun = self
            .store
            .get_payrun(tenant_id, payrun_id)?
            .ok_or(EngineError::PayrunNotFound { payrun_id })?;
        if !payrun.status.can_validate() {
            return Err(EngineError::InvalidTransition {
                payrun_id,
                current: payrun.status,
                action: "validate",
            });
        }

        payrun.status = PayrunStatus::Validated;
        payrun.validated_by = Some(validated_by.to_string());
        payrun.validated_at = Some(Utc::now());
        payrun.updated_at = Utc::now();
        self.store.update_payrun(&payrun)?;
        self.mirror_payslip_status(tenant_id, payrun_id, PayrunStatus::Validated)?;

        info!(tenant_id, payrun_id = %payrun.id, validated_by, "Payrun validated");
        Ok(payrun)
    }

    /// Finalizes a validated payrun to `done`, freezing its payslips
    /// permanently.
    pub async fn finalize(&self, tenant_id: &str, payrun_id: Uuid) -> EngineResult<Payrun> {
        let _guard = self.locks.acquire(payrun_id).await;

        let mut payrun = self
            .store
            .get_payrun(tenant_id, payrun_id)?
            .ok_or(EngineError::PayrunNotFound { payrun_id })?;
        if !payrun.status.can_finalize() {
            return Err(EngineError::InvalidTransition {
                payrun_id,
                current: payrun.status,
                action: "finalize",
            });
        }

        payrun.status = PayrunStatus::Done;
        payrun.updated_at = Utc::now();
        self.store.update_payrun(&payrun)?;
        self.mirror_payslip_status(tenant_id, payrun_id, PayrunStatus::Done)?;

        info!(tenant_id, payrun_id = %payrun.id, "Payrun finalized");
        Ok(payrun)
    }

    /// Cancels a payrun from any non-terminal state. Payslips remain for
    /// audit but are marked non-authoritative via the mirrored status.
    pub async fn cancel(&self, tenant_id: &str, payrun_id: Uuid) -> EngineResult<Payrun> {
        let _guard = self.locks.acquire(payrun_id).await;

        let mut payrun = self
            .store
            .get_payrun(tenant_id, payrun_id)?
            .ok_or(EngineError::PayrunNotFound { payrun_id })?;
        if !payrun.status.can_cancel() {
            return Err(EngineError::InvalidTransition {
                payrun_id,
                current: payrun.status,
                action: "cancel",
            });
        }

        payrun.status = PayrunStatus::Cancelled;
        payrun.updated_at = Utc::now();
        self.store.update_payrun(&payrun)?;
        self.mirror_payslip_status(tenant_id, payrun_id, PayrunStatus::Cancelled)?;

        info!(tenant_id, payrun_id = %payrun.id, "Payrun cancelled");
        Ok(payrun)
    }

    /// Re-runs the resolver for a single employee and overwrites that
    /// payslip only, adjusting the payrun's totals by the delta.
    ///
    /// The parent payrun's status is checked under its lock at the moment
    /// of the write: a payrun that has since reached a terminal state
    /// rejects the recompute with [`EngineError::PayslipFrozen`].
    pub async fn recompute_payslip(
        &self,
        tenant_id: &str,
        payslip_id: Uuid,
    ) -> EngineResult<Payslip> {
        // This first read only learns which payrun to lock.
        let payrun_id = self
            .store
            .get_payslip(tenant_id, payslip_id)?
            .ok_or(EngineError::PayslipNotFound { payslip_id })?
            .payrun_id;

        let _guard = self.locks.acquire(payrun_id).await;

        // Re-read under the lock: a compute that won the lock first may
        // have overwritten the payslip, and the totals delta below must
        // be taken against the stored breakdown, not a stale snapshot.
        let payslip = self
            .store
            .get_payslip(tenant_id, payslip_id)?
            .ok_or(EngineError::PayslipNotFound { payslip_id })?;

        let mut payrun = self
            .store
            .get_payrun(tenant_id, payslip.payrun_id)?
            .ok_or(EngineError::PayrunNotFound {
                payrun_id: payslip.payrun_id,
            })?;
        if payrun.status.is_terminal() {
            return Err(EngineError::PayslipFrozen {
                payslip_id,
                status: payrun.status,
            });
        }

        let config = self
            .store
            .latest_wage_configuration(tenant_id, &payslip.employee_id)?
            .ok_or_else(|| EngineError::NotComputable {
                employee_id: payslip.employee_id.clone(),
                reason: "no wage configuration".to_string(),
            })?;
        let outcome = resolve_configuration(&config)?;
        let proration =
            self.attendance
                .payable_days(tenant_id, &payslip.employee_id, payslip.period)?;

        payrun.gross_total += outcome.breakdown.gross_monthly - payslip.breakdown.gross_monthly;
        payrun.net_total += outcome.breakdown.net_salary - payslip.breakdown.net_salary;
        payrun.updated_at = Utc::now();

        let updated = Payslip {
            breakdown: outcome.breakdown,
            proration,
            computed_at: Utc::now(),
            ..payslip
        };
        self.store.upsert_payslip(updated.clone())?;
        self.store.update_payrun(&payrun)?;

        info!(
            tenant_id,
            payslip_id = %payslip_id,
            payrun_id = %payrun.id,
            employee_id = %updated.employee_id,
            "Payslip recomputed"
        );
        Ok(updated)
    }

    fn mirror_payslip_status(
        &self,
        tenant_id: &str,
        payrun_id: Uuid,
        status: PayrunStatus,
    ) -> EngineResult<()> {
        for mut payslip in self.store.payslips_for_payrun(tenant_id, payrun_id)? {
            payslip.status = status;
            self.store.upsert_payslip(payslip)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComponentRule, WageConfiguration, WageType};
    use crate::store::{EmployeeProfile, FixedAttendance, MemoryDirectory, MemoryStore};
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn period() -> Period {
        Period::new(2026, 1).unwrap()
    }

    fn reference_rules() -> BTreeMap<String, ComponentRule> {
        let mut rules = BTreeMap::new();
        rules.insert(
            "basic".to_string(),
            ComponentRule::PercentageOfWage(dec("50")),
        );
        rules.insert(
            "hra".to_string(),
            ComponentRule::PercentageOfBasic(dec("40")),
        );
        rules.insert(
            "fixed_allowance".to_string(),
            ComponentRule::RemainingAmount,
        );
        rules
    }

    fn seed_config(store: &MemoryStore, employee_id: &str, wage: &str) {
        store
            .insert_wage_configuration(WageConfiguration {
                id: Uuid::new_v4(),
                tenant_id: "acme".to_string(),
                employee_id: employee_id.to_string(),
                wage: dec(wage),
                wage_type: WageType::Fixed,
                component_rules: reference_rules(),
                deduction_rate: dec("12"),
                fixed_deduction: dec("200"),
                basic: Decimal::ZERO,
                allowances: BTreeMap::new(),
                created_at: Utc::now(),
            })
            .unwrap();
    }

    fn seed_employee(directory: &MemoryDirectory, id: &str) {
        directory.add_employee(
            "acme",
            EmployeeProfile {
                id: id.to_string(),
                bank_account: Some("bank_001".to_string()),
                manager_id: Some("mgr_001".to_string()),
            },
        );
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        directory: Arc<MemoryDirectory>,
        controller: PayrunController,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let directory = Arc::new(MemoryDirectory::new());
        let attendance = Arc::new(FixedAttendance::new(dec("22")));
        let controller = PayrunController::new(
            store.clone() as Arc<dyn PayrollStore>,
            directory.clone() as Arc<dyn EmployeeDirectory>,
            attendance as Arc<dyn AttendanceProvider>,
        );
        Fixture {
            store,
            directory,
            controller,
        }
    }

    #[test]
    fn test_create_rejects_duplicate_period() {
        let f = fixture();
        f.controller.create("acme", period(), "admin").unwrap();

        match f.controller.create("acme", period(), "admin").unwrap_err() {
            EngineError::PayrunExists { tenant_id, .. } => assert_eq!(tenant_id, "acme"),
            other => panic!("Expected PayrunExists, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_allowed_after_cancel() {
        let f = fixture();
        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.cancel("acme", payrun.id).await.unwrap();

        assert!(f.controller.create("acme", period(), "admin").is_ok());
    }

    #[tokio::test]
    async fn test_compute_writes_payslips_and_totals() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_employee(&f.directory, "emp_002");
        seed_config(&f.store, "emp_001", "50000");
        seed_config(&f.store, "emp_002", "30000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        let outcome = f.controller.compute("acme", payrun.id).await.unwrap();

        assert_eq!(outcome.payrun.status, PayrunStatus::Computed);
        assert_eq!(outcome.payrun.employees_count, 2);
        assert_eq!(outcome.payrun.gross_total, dec("80000"));
        // net = (50000 - 3000 - 200) + (30000 - 1800 - 200)
        assert_eq!(outcome.payrun.net_total, dec("74800"));
        assert!(outcome.warnings.is_empty());

        let slips = f.store.payslips_for_payrun("acme", payrun.id).unwrap();
        assert_eq!(slips.len(), 2);
        assert!(slips.iter().all(|s| s.status == PayrunStatus::Computed));
    }

    #[tokio::test]
    async fn test_compute_is_idempotent_and_reuses_payslip_ids() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_config(&f.store, "emp_001", "50000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.compute("acme", payrun.id).await.unwrap();
        let first: Vec<Uuid> = f
            .store
            .payslips_for_payrun("acme", payrun.id)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();

        let second = f.controller.compute("acme", payrun.id).await.unwrap();
        assert_eq!(second.payrun.employees_count, 1);
        let after: Vec<Uuid> = f
            .store
            .payslips_for_payrun("acme", payrun.id)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(first, after);
    }

    #[tokio::test]
    async fn test_compute_collects_warnings_without_aborting() {
        let f = fixture();
        // Has config but no bank account or manager.
        f.directory.add_employee(
            "acme",
            EmployeeProfile {
                id: "emp_001".to_string(),
                bank_account: None,
                manager_id: None,
            },
        );
        seed_config(&f.store, "emp_001", "50000");
        // Active but no wage configuration at all.
        seed_employee(&f.directory, "emp_002");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        let outcome = f.controller.compute("acme", payrun.id).await.unwrap();

        assert_eq!(outcome.payrun.status, PayrunStatus::Computed);
        assert_eq!(outcome.payrun.employees_count, 1);
        let codes: Vec<&str> = outcome.warnings.iter().map(|w| w.code.as_str()).collect();
        assert!(codes.contains(&"missing_payout_destination"));
        assert!(codes.contains(&"missing_reporting_manager"));
        assert!(codes.contains(&"missing_wage_configuration"));
    }

    #[tokio::test]
    async fn test_compute_rejected_after_validate() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_config(&f.store, "emp_001", "50000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.compute("acme", payrun.id).await.unwrap();
        f.controller
            .validate("acme", payrun.id, "approver")
            .await
            .unwrap();

        match f.controller.compute("acme", payrun.id).await.unwrap_err() {
            EngineError::InvalidTransition {
                current, action, ..
            } => {
                assert_eq!(current, PayrunStatus::Validated);
                assert_eq!(action, "compute");
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_requires_computed() {
        let f = fixture();
        let payrun = f.controller.create("acme", period(), "admin").unwrap();

        assert!(matches!(
            f.controller
                .validate("acme", payrun.id, "approver")
                .await
                .unwrap_err(),
            EngineError::InvalidTransition { .. }
        ));
    }

    #[tokio::test]
    async fn test_double_validate_rejected() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_config(&f.store, "emp_001", "50000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.compute("acme", payrun.id).await.unwrap();
        f.controller
            .validate("acme", payrun.id, "approver")
            .await
            .unwrap();

        assert!(matches!(
            f.controller
                .validate("acme", payrun.id, "approver")
                .await
                .unwrap_err(),
            EngineError::InvalidTransition { .. }
        ));
    }

    #[tokio::test]
    async fn test_finalize_freezes_payslips() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_config(&f.store, "emp_001", "50000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.compute("acme", payrun.id).await.unwrap();
        f.controller
            .validate("acme", payrun.id, "approver")
            .await
            .unwrap();
        let done = f.controller.finalize("acme", payrun.id).await.unwrap();
        assert_eq!(done.status, PayrunStatus::Done);

        let slips = f.store.payslips_for_payrun("acme", payrun.id).unwrap();
        assert!(slips.iter().all(|s| s.status == PayrunStatus::Done));

        // Mutating a frozen payslip fails with a structured error.
        match f
            .controller
            .recompute_payslip("acme", slips[0].id)
            .await
            .unwrap_err()
        {
            EngineError::PayslipFrozen { status, .. } => assert_eq!(status, PayrunStatus::Done),
            other => panic!("Expected PayslipFrozen, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recompute_rejected_on_cancelled_payrun() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_config(&f.store, "emp_001", "50000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.compute("acme", payrun.id).await.unwrap();
        let slip_id = f.store.payslips_for_payrun("acme", payrun.id).unwrap()[0].id;
        f.controller.cancel("acme", payrun.id).await.unwrap();

        assert!(matches!(
            f.controller
                .recompute_payslip("acme", slip_id)
                .await
                .unwrap_err(),
            EngineError::PayslipFrozen { .. }
        ));
    }

    #[tokio::test]
    async fn test_recompute_adjusts_totals_by_delta() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_config(&f.store, "emp_001", "50000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.compute("acme", payrun.id).await.unwrap();

        // New configuration version with a raised wage; latest wins.
        seed_config(&f.store, "emp_001", "60000");
        let slip_id = f.store.payslips_for_payrun("acme", payrun.id).unwrap()[0].id;
        let updated = f
            .controller
            .recompute_payslip("acme", slip_id)
            .await
            .unwrap();

        assert_eq!(updated.breakdown.gross_monthly, dec("60000"));
        let payrun = f.store.get_payrun("acme", payrun.id).unwrap().unwrap();
        assert_eq!(payrun.gross_total, dec("60000"));
        // 60000 - 3600 - 200
        assert_eq!(payrun.net_total, dec("56200"));
        // Recompute does not change the payrun's status.
        assert_eq!(payrun.status, PayrunStatus::Computed);
    }

    #[tokio::test]
    async fn test_cancel_marks_payslips_non_authoritative() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_config(&f.store, "emp_001", "50000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.compute("acme", payrun.id).await.unwrap();
        f.controller.cancel("acme", payrun.id).await.unwrap();

        let slips = f.store.payslips_for_payrun("acme", payrun.id).unwrap();
        assert_eq!(slips.len(), 1);
        assert!(slips.iter().all(|s| s.status == PayrunStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_terminal_states_reject_everything() {
        let f = fixture();
        seed_employee(&f.directory, "emp_001");
        seed_config(&f.store, "emp_001", "50000");

        let payrun = f.controller.create("acme", period(), "admin").unwrap();
        f.controller.compute("acme", payrun.id).await.unwrap();
        f.controller.cancel("acme", payrun.id).await.unwrap();

        assert!(f.controller.compute("acme", payrun.id).await.is_err());
        assert!(
            f.controller
                .validate("acme", payrun.id, "x")
                .await
                .is_err()
        );
        assert!(f.controller.finalize("acme", payrun.id).await.is_err());
        assert!(f.controller.cancel("acme", payrun.id).await.is_err());
    }

    /// [`PayrollStore`] wrapper that stalls the next `get_payslip` call
    /// until released, so a test can interleave another operation inside
    /// the window between a recompute's first read and its lock.
    struct GatedStore {
        inner: Arc<MemoryStore>,
        armed: std::sync::atomic::AtomicBool,
        reached: std::sync::Mutex<std::sync::mpsc::Sender<()>>,
        release: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl PayrollStore for GatedStore {
        fn insert_wage_configuration(&self, config: WageConfiguration) -> EngineResult<()> {
            self.inner.insert_wage_configuration(config)
        }
        fn latest_wage_configuration(
            &self,
            tenant_id: &str,
            employee_id: &str,
        ) -> EngineResult<Option<WageConfiguration>> {
            self.inner.latest_wage_configuration(tenant_id, employee_id)
        }
        fn insert_payrun(&self, payrun: Payrun) -> EngineResult<()> {
            self.inner.insert_payrun(payrun)
        }
        fn update_payrun(&self, payrun: &Payrun) -> EngineResult<()> {
            self.inner.update_payrun(payrun)
        }
        fn get_payrun(&self, tenant_id: &str, payrun_id: Uuid) -> EngineResult<Option<Payrun>> {
            self.inner.get_payrun(tenant_id, payrun_id)
        }
        fn find_active_payrun(
            &self,
            tenant_id: &str,
            period: Period,
        ) -> EngineResult<Option<Payrun>> {
            self.inner.find_active_payrun(tenant_id, period)
        }
        fn upsert_payslip(&self, payslip: Payslip) -> EngineResult<()> {
            self.inner.upsert_payslip(payslip)
        }
        fn get_payslip(&self, tenant_id: &str, payslip_id: Uuid) -> EngineResult<Option<Payslip>> {
            if self
                .armed
                .swap(false, std::sync::atomic::Ordering::SeqCst)
            {
                self.reached.lock().unwrap().send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
            }
            self.inner.get_payslip(tenant_id, payslip_id)
        }
        fn find_payslip(
            &self,
            tenant_id: &str,
            payrun_id: Uuid,
            employee_id: &str,
        ) -> EngineResult<Option<Payslip>> {
            self.inner.find_payslip(tenant_id, payrun_id, employee_id)
        }
        fn payslips_for_payrun(
            &self,
            tenant_id: &str,
            payrun_id: Uuid,
        ) -> EngineResult<Vec<Payslip>> {
            self.inner.payslips_for_payrun(tenant_id, payrun_id)
        }
        fn payslips_for_year(
            &self,
            tenant_id: &str,
            employee_id: &str,
            year: i32,
        ) -> EngineResult<Vec<Payslip>> {
            self.inner.payslips_for_year(tenant_id, employee_id, year)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_recompute_delta_taken_against_stored_payslip_not_snapshot() {
        use std::sync::atomic::AtomicBool;
        use std::sync::{Mutex, mpsc};
        use std::time::Duration;

        let memory = Arc::new(MemoryStore::new());
        let (reached_tx, reached_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let gated = Arc::new(GatedStore {
            inner: memory.clone(),
            armed: AtomicBool::new(false),
            reached: Mutex::new(reached_tx),
            release: Mutex::new(release_rx),
        });

        let directory = Arc::new(MemoryDirectory::new());
        seed_employee(&directory, "emp_001");
        seed_config(&memory, "emp_001", "50000");

        let controller = Arc::new(PayrunController::new(
            gated.clone() as Arc<dyn PayrollStore>,
            directory as Arc<dyn EmployeeDirectory>,
            Arc::new(FixedAttendance::new(dec("22"))) as Arc<dyn AttendanceProvider>,
        ));

        let payrun = controller.create("acme", period(), "admin").unwrap();
        controller.compute("acme", payrun.id).await.unwrap();
        let payslip = memory
            .find_payslip("acme", payrun.id, "emp_001")
            .unwrap()
            .unwrap();

        // Stall the recompute on its first payslip read, before it takes
        // the payrun lock.
        gated.armed.store(true, std::sync::atomic::Ordering::SeqCst);
        let recompute = {
            let controller = controller.clone();
            let payslip_id = payslip.id;
            tokio::spawn(async move { controller.recompute_payslip("acme", payslip_id).await })
        };
        reached_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("recompute did not reach the payslip read");

        // A raise lands and a full compute wins the race: the payslip and
        // the totals now reflect the 60,000 wage.
        seed_config(&memory, "emp_001", "60000");
        controller.compute("acme", payrun.id).await.unwrap();

        release_tx.send(()).unwrap();
        recompute.await.unwrap().unwrap();

        // The recompute must not have applied a delta taken against its
        // pre-race snapshot; totals stay consistent with the payslip.
        let payrun = memory.get_payrun("acme", payrun.id).unwrap().unwrap();
        let payslip = memory.get_payslip("acme", payslip.id).unwrap().unwrap();
        assert_eq!(payrun.gross_total, dec("60000"));
        assert_eq!(payrun.gross_total, payslip.breakdown.gross_monthly);
        assert_eq!(payrun.net_total, payslip.breakdown.net_salary);
    }
}
