//! Core data models for the Compensation Resolution Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod breakdown;
mod payrun;
mod payslip;
mod period;
mod statement;
mod wage_config;

pub use breakdown::{ComputedBreakdown, ResolveWarning};
pub use payrun::{Payrun, PayrunStatus};
pub use payslip::{Payslip, ProrationInput};
pub use period::Period;
pub use statement::{AnnualStatement, NetSummary, StatementRow};
pub use wage_config::{CompensationPlan, ComponentRule, WageConfiguration, WageType};
