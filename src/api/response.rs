//! Response types for the Compensation Resolution Engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::SettingsNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "SETTINGS_ERROR",
                    "Settings error",
                    format!("Settings file not found: {path}"),
                ),
            },
            EngineError::SettingsParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "SETTINGS_ERROR",
                    "Settings parse error",
                    format!("Failed to parse {path}: {message}"),
                ),
            },
            EngineError::NotComputable {
                ref employee_id, ..
            } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "NOT_COMPUTABLE",
                    error.to_string(),
                    format!("Employee '{employee_id}' cannot be resolved to a pay breakdown"),
                ),
            },
            EngineError::InvalidTransition {
                payrun_id,
                current,
                action,
            } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "INVALID_TRANSITION",
                    format!("Cannot {action} payrun {payrun_id} from state '{current}'"),
                    "The payrun lifecycle does not allow the requested transition",
                ),
            },
            EngineError::PayrunExists { tenant_id, period } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "PAYRUN_EXISTS",
                    format!("A payrun already exists for tenant '{tenant_id}' and period {period}"),
                    "Cancel the existing payrun before creating a new one for this period",
                ),
            },
            EngineError::PayrunNotFound { payrun_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("NOT_FOUND", format!("Payrun not found: {payrun_id}")),
            },
            EngineError::PayslipNotFound { payslip_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("NOT_FOUND", format!("Payslip not found: {payslip_id}")),
            },
            EngineError::PayslipFrozen { payslip_id, status } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "PAYSLIP_FROZEN",
                    format!("Payslip {payslip_id} is frozen"),
                    format!("The parent payrun is '{status}' and accepts no further changes"),
                ),
            },
            EngineError::InsufficientData { employee_id, year } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "INSUFFICIENT_DATA",
                    format!("No statement can be reconstructed for '{employee_id}' in {year}"),
                    "The year has no finalized payslips and no wage configuration exists",
                ),
            },
            EngineError::Internal { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("INTERNAL_ERROR", "Internal error", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_invalid_transition_maps_to_conflict() {
        let engine_error = EngineError::InvalidTransition {
            payrun_id: Uuid::nil(),
            current: crate::models::PayrunStatus::Done,
            action: "compute",
        };
        let api_error: ApiErrorResponse = engine_error.into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "INVALID_TRANSITION");
    }

    #[test]
    fn test_not_computable_maps_to_bad_request() {
        let engine_error = EngineError::NotComputable {
            employee_id: "emp_001".to_string(),
            reason: "wage must be greater than zero".to_string(),
        };
        let api_error: ApiErrorResponse = engine_error.into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "NOT_COMPUTABLE");
        assert!(api_error.error.message.contains("emp_001"));
    }

    #[test]
    fn test_internal_error_does_not_leak_storage_detail() {
        let engine_error = EngineError::Internal {
            message: "store lock poisoned".to_string(),
        };
        let api_error: ApiErrorResponse = engine_error.into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "INTERNAL_ERROR");
        assert_eq!(api_error.error.message, "Internal error");
    }
}
