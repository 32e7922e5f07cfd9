//! Reconstructing a full-year salary statement from finalized payslips.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::config::PayrollSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{AnnualStatement, NetSummary, PayrunStatus, Payslip, StatementRow};
use crate::money::{percent_of, round_money};
use crate::resolver::{BASIC, canonical_key, resolve_configuration};
use crate::store::PayrollStore;

const MONTH_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Statement key for the provident-fund deduction.
const PROVIDENT_FUND: &str = "provident_fund";
/// Statement key for the flat professional-tax deduction.
const PROFESSIONAL_TAX: &str = "professional_tax";

/// Rebuilds a full-year salary statement for one employee.
///
/// Read-only and deterministic given the same underlying data: months with
/// a finalized payslip contribute their actual amounts; missing months are
/// synthesized from the employee's current wage configuration and flagged.
/// Takes no locks; a payrun observed mid-transition is acceptable for
/// reporting.
pub struct Reconstructor {
    store: Arc<dyn PayrollStore>,
    settings: PayrollSettings,
}

impl Reconstructor {
    /// Creates a reconstructor over the given store and settings.
    pub fn new(store: Arc<dyn PayrollStore>, settings: PayrollSettings) -> Self {
        Self { store, settings }
    }

    /// Reconstructs the statement for one employee and calendar year.
    ///
    /// Fails with [`EngineError::InsufficientData`] only when the year has
    /// no finalized payslips AND the employee has no wage configuration to
    /// estimate from.
    pub fn reconstruct(
        &self,
        tenant_id: &str,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<AnnualStatement> {
        let finalized: Vec<Payslip> = self
            .store
            .payslips_for_year(tenant_id, employee_id, year)?
            .into_iter()
            .filter(|p| p.status == PayrunStatus::Done)
            .collect();

        let actual_months: BTreeSet<u32> = finalized.iter().map(|p| p.period.month()).collect();
        let missing_months: Vec<u32> = (1..=12)
            .filter(|month| !actual_months.contains(month))
            .collect();

        let mut earnings: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut deductions: BTreeMap<String, Decimal> = BTreeMap::new();

        // Actual months contribute their stored amounts, summed per key.
        for slip in &finalized {
            *earnings.entry(BASIC.to_string()).or_insert(Decimal::ZERO) += slip.breakdown.basic;
            for (key, amount) in &slip.breakdown.allowances {
                *earnings.entry(canonical_key(key)).or_insert(Decimal::ZERO) += *amount;
            }
            if slip.breakdown.deduction_employee > Decimal::ZERO {
                *deductions
                    .entry(PROVIDENT_FUND.to_string())
                    .or_insert(Decimal::ZERO) += slip.breakdown.deduction_employee;
            }
            // The configured amount, not `gross − deduction − net`: the
            // legacy net floor-clamp would make the derived figure lie.
            if slip.breakdown.fixed_deduction > Decimal::ZERO {
                *deductions
                    .entry(PROFESSIONAL_TAX.to_string())
                    .or_insert(Decimal::ZERO) += slip.breakdown.fixed_deduction;
            }
        }

        // Missing months are synthesized from the current configuration.
        let mut estimated_months: Vec<String> = Vec::new();
        if !missing_months.is_empty() {
            match self
                .store
                .latest_wage_configuration(tenant_id, employee_id)?
            {
                Some(config) => {
                    let breakdown = resolve_configuration(&config)?.breakdown;
                    let count = Decimal::from(missing_months.len() as u64);

                    *earnings.entry(BASIC.to_string()).or_insert(Decimal::ZERO) +=
                        breakdown.basic * count;
                    for (key, amount) in &breakdown.allowances {
                        *earnings.entry(key.clone()).or_insert(Decimal::ZERO) += *amount * count;
                    }

                    let pf_base = breakdown.basic.min(self.settings.provident_fund_cap);
                    let pf = percent_of(pf_base, config.deduction_rate);
                    if pf > Decimal::ZERO {
                        *deductions
                            .entry(PROVIDENT_FUND.to_string())
                            .or_insert(Decimal::ZERO) += pf * count;
                    }
                    if breakdown.components_total() >= self.settings.professional_tax.threshold {
                        *deductions
                            .entry(PROFESSIONAL_TAX.to_string())
                            .or_insert(Decimal::ZERO) +=
                            self.settings.professional_tax.monthly_amount * count;
                    }

                    estimated_months = missing_months
                        .iter()
                        .map(|month| MONTH_LABELS[(month - 1) as usize].to_string())
                        .collect();
                }
                None if finalized.is_empty() => {
                    return Err(EngineError::InsufficientData {
                        employee_id: employee_id.to_string(),
                        year,
                    });
                }
                // Actual months exist but the configuration is gone:
                // average over the actual months only.
                None => {}
            }
        }

        let months_for_calculation = if estimated_months.is_empty() {
            actual_months.len() as u32
        } else {
            (actual_months.len() + estimated_months.len()) as u32
        }
        .max(1);
        let divisor = Decimal::from(months_for_calculation);

        let mut earning_rows = to_rows(earnings, divisor);
        // "basic" first, the rest stays alphabetical.
        earning_rows.sort_by(|a, b| match (a.key.as_str(), b.key.as_str()) {
            (BASIC, _) => std::cmp::Ordering::Less,
            (_, BASIC) => std::cmp::Ordering::Greater,
            (left, right) => left.cmp(right),
        });
        let deduction_rows = to_rows(deductions, divisor);

        let earnings_yearly: Decimal = earning_rows.iter().map(|r| r.yearly_total).sum();
        let deductions_yearly: Decimal = deduction_rows.iter().map(|r| r.yearly_total).sum();
        let net_yearly = earnings_yearly - deductions_yearly;

        info!(
            tenant_id,
            employee_id,
            year,
            actual_months = actual_months.len(),
            estimated_months = estimated_months.len(),
            "Statement reconstructed"
        );

        Ok(AnnualStatement {
            employee_id: employee_id.to_string(),
            year,
            earnings: earning_rows,
            deductions: deduction_rows,
            net_salary: NetSummary {
                monthly: round_money(net_yearly / divisor),
                yearly: net_yearly,
            },
            estimated_months,
            months_for_calculation,
        })
    }
}

fn to_rows(totals: BTreeMap<String, Decimal>, divisor: Decimal) -> Vec<StatementRow> {
    totals
        .into_iter()
        .map(|(key, yearly_total)| StatementRow {
            key,
            monthly_average: round_money(yearly_total / divisor),
            yearly_total,
        })
        .collect()
}
