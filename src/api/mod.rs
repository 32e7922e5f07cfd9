//! HTTP API module for the Compensation Resolution Engine.
//!
//! This module provides the REST endpoints for the payrun lifecycle,
//! single-payslip recomputation, current-salary resolution and annual
//! statement reconstruction. Authentication, tenant resolution and input
//! validation frameworks live upstream; handlers receive an already-scoped
//! tenant identifier in the path.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CreatePayrunRequest, ValidatePayrunRequest};
pub use response::ApiError;
pub use state::AppState;
