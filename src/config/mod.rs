//! Tenant payroll settings.
//!
//! Settings that apply across a tenant's payroll rather than per employee:
//! the currency code, the provident-fund cap used for estimates, and the
//! professional-tax threshold and flat amount.

mod loader;
mod types;

pub use loader::SettingsLoader;
pub use types::{PayrollSettings, ProfessionalTax};
