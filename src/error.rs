//! Error types for the Compensation Resolution Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur across the resolver, the payrun
//! lifecycle and the statement reconstructor.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Period, PayrunStatus};

/// The main error type for the Compensation Resolution Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::NotComputable {
///     employee_id: "emp_001".to_string(),
///     reason: "wage must be greater than zero".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Employee 'emp_001' is not computable: wage must be greater than zero"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Settings file was not found at the specified path.
    #[error("Settings file not found: {path}")]
    SettingsNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Settings file could not be parsed.
    #[error("Failed to parse settings file '{path}': {message}")]
    SettingsParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An employee's wage configuration cannot be resolved into a breakdown.
    #[error("Employee '{employee_id}' is not computable: {reason}")]
    NotComputable {
        /// The employee whose configuration was rejected.
        employee_id: String,
        /// A description of what made the configuration invalid.
        reason: String,
    },

    /// A lifecycle operation was requested from a state that does not allow it.
    #[error("Invalid transition for payrun {payrun_id}: cannot {action} from '{current}'")]
    InvalidTransition {
        /// The payrun the transition was attempted on.
        payrun_id: Uuid,
        /// The payrun's status at the moment of the check.
        current: PayrunStatus,
        /// The requested action (e.g. "compute", "validate").
        action: &'static str,
    },

    /// A non-cancelled payrun already exists for the tenant and period.
    #[error("A payrun already exists for tenant '{tenant_id}' and period {period}")]
    PayrunExists {
        /// The tenant the payrun belongs to.
        tenant_id: String,
        /// The period that is already covered.
        period: Period,
    },

    /// No payrun exists with the given identifier.
    #[error("Payrun not found: {payrun_id}")]
    PayrunNotFound {
        /// The identifier that was not found.
        payrun_id: Uuid,
    },

    /// No payslip exists with the given identifier.
    #[error("Payslip not found: {payslip_id}")]
    PayslipNotFound {
        /// The identifier that was not found.
        payslip_id: Uuid,
    },

    /// The payslip belongs to a finalized payrun and can no longer change.
    #[error("Payslip {payslip_id} is frozen: parent payrun is '{status}'")]
    PayslipFrozen {
        /// The payslip that was targeted.
        payslip_id: Uuid,
        /// The terminal status of the parent payrun.
        status: PayrunStatus,
    },

    /// A statement was requested but there is nothing to build it from.
    #[error(
        "Insufficient data to reconstruct a statement for employee '{employee_id}' in {year}: \
         no finalized payslips and no wage configuration"
    )]
    InsufficientData {
        /// The employee the statement was requested for.
        employee_id: String,
        /// The requested calendar year.
        year: i32,
    },

    /// An internal failure (store, lock) wrapped without storage detail.
    #[error("Internal error: {message}")]
    Internal {
        /// A description safe to surface to callers.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
