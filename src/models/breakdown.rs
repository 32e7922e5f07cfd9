//! Itemized pay breakdown produced by the component resolver.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The fully itemized result of resolving one wage configuration.
///
/// Not persisted on its own; it becomes durable only as part of a
/// [`Payslip`](crate::models::Payslip).
///
/// Invariants: `basic + Σallowances ≤ wage + ε` when the catch-all rule is
/// `remaining_amount`; `net_salary = gross_monthly − deduction_employee −
/// fixed_deduction`, floor-clamped at zero only for legacy configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedBreakdown {
    /// The basic component of the wage.
    pub basic: Decimal,
    /// Named allowance components, keyed by canonical component name.
    pub allowances: BTreeMap<String, Decimal>,
    /// Gross monthly pay (the configured wage).
    pub gross_monthly: Decimal,
    /// Gross yearly pay (`gross_monthly × 12`).
    pub gross_yearly: Decimal,
    /// Employee provident-fund contribution (`basic × deduction_rate / 100`).
    pub deduction_employee: Decimal,
    /// Employer provident-fund contribution (same formula as the employee's).
    pub deduction_employer: Decimal,
    /// The configured flat deduction applied this month.
    ///
    /// Carried on the breakdown so downstream readers (statements in
    /// particular) do not have to derive it from `net_salary`, which for
    /// legacy configurations may have been floor-clamped at zero.
    pub fixed_deduction: Decimal,
    /// Net monthly salary after employee deduction and fixed deduction.
    pub net_salary: Decimal,
}

impl ComputedBreakdown {
    /// Sum of basic and all allowance components.
    pub fn components_total(&self) -> Decimal {
        self.basic + self.allowances.values().copied().sum::<Decimal>()
    }
}

/// A non-fatal condition observed while resolving a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ResolveWarning {
    /// Components exceeded the wage and the catch-all could not absorb the
    /// excess. The breakdown still carries the best-effort clamped values.
    OverAllocated {
        /// How far the components exceed the wage after clamping.
        excess: Decimal,
    },
}
