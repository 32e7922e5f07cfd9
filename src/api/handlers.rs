//! HTTP request handlers for the Compensation Resolution Engine API.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::resolver::resolve_configuration;

use super::request::{CreatePayrunRequest, ValidatePayrunRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/tenants/:tenant_id/payruns", post(create_payrun_handler))
        .route(
            "/tenants/:tenant_id/payruns/:payrun_id/compute",
            post(compute_handler),
        )
        .route(
            "/tenants/:tenant_id/payruns/:payrun_id/validate",
            post(validate_handler),
        )
        .route(
            "/tenants/:tenant_id/payruns/:payrun_id/finalize",
            post(finalize_handler),
        )
        .route(
            "/tenants/:tenant_id/payruns/:payrun_id/cancel",
            post(cancel_handler),
        )
        .route(
            "/tenants/:tenant_id/payslips/:payslip_id/recompute",
            post(recompute_handler),
        )
        .route(
            "/tenants/:tenant_id/employees/:employee_id/salary",
            get(salary_handler),
        )
        .route(
            "/tenants/:tenant_id/employees/:employee_id/statement/:year",
            get(statement_handler),
        )
        .with_state(state)
}

/// Maps a JSON extraction rejection to the API error body.
fn rejection_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries the detailed error from serde.
            let body_text = err.body_text();
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            ApiError::malformed_json(format!("Invalid JSON syntax: {err}"))
        }
        JsonRejection::MissingJsonContentType(_) => ApiError::new(
            "MISSING_CONTENT_TYPE",
            "Content-Type must be application/json",
        ),
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

fn error_response(err: EngineError) -> Response {
    let api: ApiErrorResponse = err.into();
    api.into_response()
}

/// Handler for POST /tenants/{tenant}/payruns.
async fn create_payrun_handler(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<CreatePayrunRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(tenant_id, "Rejected payrun creation payload");
            return (StatusCode::BAD_REQUEST, Json(rejection_error(rejection))).into_response();
        }
    };

    match state
        .controller()
        .create(&tenant_id, request.period, &request.created_by)
    {
        Ok(payrun) => (StatusCode::CREATED, Json(payrun)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for POST /tenants/{tenant}/payruns/{id}/compute.
async fn compute_handler(
    State(state): State<AppState>,
    Path((tenant_id, payrun_id)): Path<(String, Uuid)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tenant_id, %payrun_id, "Processing compute request");

    match state.controller().compute(&tenant_id, payrun_id).await {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                employees_count = outcome.payrun.employees_count,
                warnings = outcome.warnings.len(),
                "Compute completed"
            );
            Json(outcome).into_response()
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Compute failed");
            error_response(err)
        }
    }
}

/// Handler for POST /tenants/{tenant}/payruns/{id}/validate.
async fn validate_handler(
    State(state): State<AppState>,
    Path((tenant_id, payrun_id)): Path<(String, Uuid)>,
    payload: Result<Json<ValidatePayrunRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, Json(rejection_error(rejection))).into_response();
        }
    };

    match state
        .controller()
        .validate(&tenant_id, payrun_id, &request.validated_by)
        .await
    {
        Ok(payrun) => Json(payrun).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for POST /tenants/{tenant}/payruns/{id}/finalize.
async fn finalize_handler(
    State(state): State<AppState>,
    Path((tenant_id, payrun_id)): Path<(String, Uuid)>,
) -> Response {
    match state.controller().finalize(&tenant_id, payrun_id).await {
        Ok(payrun) => Json(payrun).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for POST /tenants/{tenant}/payruns/{id}/cancel.
async fn cancel_handler(
    State(state): State<AppState>,
    Path((tenant_id, payrun_id)): Path<(String, Uuid)>,
) -> Response {
    match state.controller().cancel(&tenant_id, payrun_id).await {
        Ok(payrun) => Json(payrun).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for POST /tenants/{tenant}/payslips/{id}/recompute.
async fn recompute_handler(
    State(state): State<AppState>,
    Path((tenant_id, payslip_id)): Path<(String, Uuid)>,
) -> Response {
    match state
        .controller()
        .recompute_payslip(&tenant_id, payslip_id)
        .await
    {
        Ok(payslip) => Json(payslip).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for GET /tenants/{tenant}/employees/{id}/salary.
///
/// Resolves the employee's latest wage configuration on the fly and
/// returns the itemized breakdown.
async fn salary_handler(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(String, String)>,
) -> Response {
    let result: EngineResult<_> = (|| {
        let config = state
            .store()
            .latest_wage_configuration(&tenant_id, &employee_id)?
            .ok_or_else(|| EngineError::NotComputable {
                employee_id: employee_id.clone(),
                reason: "no wage configuration".to_string(),
            })?;
        resolve_configuration(&config)
    })();

    match result {
        Ok(outcome) => Json(outcome.breakdown).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for GET /tenants/{tenant}/employees/{id}/statement/{year}.
async fn statement_handler(
    State(state): State<AppState>,
    Path((tenant_id, employee_id, year)): Path<(String, String, i32)>,
) -> Response {
    match state
        .reconstructor()
        .reconstruct(&tenant_id, &employee_id, year)
    {
        Ok(statement) => Json(statement).into_response(),
        Err(err) => error_response(err),
    }
}
