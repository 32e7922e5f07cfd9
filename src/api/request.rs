//! Request types for the Compensation Resolution Engine API.

use serde::{Deserialize, Serialize};

use crate::models::Period;

/// Request body for creating a payrun.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayrunRequest {
    /// The period the payrun covers, as `"YYYY-MM"`.
    pub period: Period,
    /// Who is creating the payrun.
    pub created_by: String,
}

/// Request body for validating a payrun.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatePayrunRequest {
    /// Who is approving the payrun.
    pub validated_by: String,
}
