//! Component resolution logic.
//!
//! This module turns a wage configuration into an itemized
//! [`ComputedBreakdown`](crate::models::ComputedBreakdown): the basic
//! component first, then the named allowances in a fixed canonical order,
//! then the catch-all component, followed by deduction and net derivation.
//! Rule-based and legacy configurations each have their own entry point;
//! both are pure functions with no side effects and no I/O.

mod components;
mod legacy;
mod rule_based;

pub use components::{
    BASIC, COMPONENT_ORDER, FIXED_ALLOWANCE, canonical_key, ordered_component_keys,
};
pub use legacy::resolve_legacy;
pub use rule_based::resolve_rule_based;

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{CompensationPlan, ComputedBreakdown, ResolveWarning, WageConfiguration};

/// A resolved breakdown together with any non-fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOutcome {
    /// The itemized breakdown.
    pub breakdown: ComputedBreakdown,
    /// Non-fatal conditions observed during resolution.
    pub warnings: Vec<ResolveWarning>,
}

/// Resolves a classified compensation plan into a breakdown.
///
/// Total function: the only failure mode is upstream, in
/// [`WageConfiguration::plan`], which rejects non-positive wages.
pub fn resolve(
    plan: &CompensationPlan<'_>,
    deduction_rate: Decimal,
    fixed_deduction: Decimal,
) -> ResolveOutcome {
    match plan {
        CompensationPlan::RuleBased { wage, rules } => {
            resolve_rule_based(*wage, rules, deduction_rate, fixed_deduction)
        }
        CompensationPlan::Legacy {
            wage,
            basic,
            allowances,
        } => resolve_legacy(*wage, *basic, allowances, deduction_rate, fixed_deduction),
    }
}

/// Classifies and resolves a wage configuration in one step.
pub fn resolve_configuration(config: &WageConfiguration) -> EngineResult<ResolveOutcome> {
    let plan = config.plan()?;
    Ok(resolve(
        &plan,
        config.deduction_rate,
        config.fixed_deduction,
    ))
}
