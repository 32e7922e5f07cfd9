//! Compensation Resolution Engine.
//!
//! This crate turns a per-employee wage configuration into a fully itemized
//! pay breakdown, governs the payrun lifecycle under which those breakdowns
//! are computed and eventually frozen, and reconstructs full-year salary
//! statements even when some months have no finalized payslip.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod money;
pub mod payrun;
pub mod resolver;
pub mod statement;
pub mod store;
