//! Settings types deserialized from the payroll settings file.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Professional-tax parameters used for estimated months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalTax {
    /// Monthly earnings (basic + allowances) at or above which the tax
    /// applies.
    pub threshold: Decimal,
    /// The flat monthly tax amount.
    pub monthly_amount: Decimal,
}

/// Tenant-wide payroll settings.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollSettings;
/// use rust_decimal::Decimal;
///
/// let settings = PayrollSettings::default();
/// assert_eq!(settings.provident_fund_cap, Decimal::from(15_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSettings {
    /// ISO currency code amounts are denominated in. Single currency per
    /// tenant; no conversion.
    pub currency: String,
    /// Cap on the basic amount used as the provident-fund base when
    /// estimating months without a finalized payslip.
    pub provident_fund_cap: Decimal,
    /// Professional-tax parameters.
    pub professional_tax: ProfessionalTax,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            provident_fund_cap: Decimal::from(15_000),
            professional_tax: ProfessionalTax {
                threshold: Decimal::from(21_000),
                monthly_amount: Decimal::from(200),
            },
        }
    }
}
