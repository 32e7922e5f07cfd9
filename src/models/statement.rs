//! Annual salary statement produced by the reconstructor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One earning or deduction row of an annual statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Canonical component name (e.g. "basic", "hra", "provident_fund").
    pub key: String,
    /// Yearly total divided by the months used for calculation.
    pub monthly_average: Decimal,
    /// Accumulated total across actual and estimated months.
    pub yearly_total: Decimal,
}

/// Net salary summary of an annual statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSummary {
    /// Yearly net divided by the months used for calculation.
    pub monthly: Decimal,
    /// Yearly earnings minus yearly deductions.
    pub yearly: Decimal,
}

/// A reconstructed full-year salary statement for one employee.
///
/// Advisory reporting output, never persisted. Months without a finalized
/// payslip are synthesized from the employee's current wage configuration
/// and flagged in `estimated_months`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualStatement {
    /// The employee the statement is for.
    pub employee_id: String,
    /// The calendar year the statement covers.
    pub year: i32,
    /// Earning rows, "basic" first then alphabetical.
    pub earnings: Vec<StatementRow>,
    /// Deduction rows, alphabetical.
    pub deductions: Vec<StatementRow>,
    /// Net salary summary.
    pub net_salary: NetSummary,
    /// Month labels that lacked a finalized payslip and were estimated.
    pub estimated_months: Vec<String>,
    /// Divisor used for the monthly averages.
    pub months_for_calculation: u32,
}
