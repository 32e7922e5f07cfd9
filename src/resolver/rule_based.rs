//! Rule-based wage resolution.
//!
//! Resolves each named component against the wage in canonical order:
//! basic first, then the named allowances, then the catch-all. A
//! reconciliation step clamps the catch-all (and only the catch-all) when
//! the components over-allocate the wage.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{ComponentRule, ComputedBreakdown, ResolveWarning};
use crate::money::{EPSILON, percent_of, round_money};

use super::ResolveOutcome;
use super::components::{FIXED_ALLOWANCE, BASIC, ordered_component_keys};

/// Default basic share of the wage when no `basic` rule is configured, or
/// when the configured rule is malformed for basic (e.g. percentage of
/// itself).
const DEFAULT_BASIC_PERCENT: u32 = 50;

/// Resolves a rule-based configuration into a breakdown.
///
/// Components earlier in the order are never reduced: if they over-allocate
/// the wage beyond what the catch-all can absorb, the excess is surfaced as
/// an [`ResolveWarning::OverAllocated`] warning rather than auto-corrected.
/// That is a deliberate tenant-visible configuration outcome.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use payroll_engine::models::ComponentRule;
/// use payroll_engine::resolver::resolve_rule_based;
/// use rust_decimal::Decimal;
///
/// let mut rules = BTreeMap::new();
/// rules.insert("basic".to_string(), ComponentRule::PercentageOfWage(Decimal::from(50)));
/// rules.insert("hra".to_string(), ComponentRule::PercentageOfBasic(Decimal::from(40)));
/// rules.insert("fixed_allowance".to_string(), ComponentRule::RemainingAmount);
///
/// let outcome = resolve_rule_based(
///     Decimal::from(50_000),
///     &rules,
///     Decimal::from(12),
///     Decimal::from(200),
/// );
/// assert_eq!(outcome.breakdown.basic, Decimal::from(25_000));
/// assert_eq!(outcome.breakdown.net_salary, Decimal::from(46_800));
/// ```
pub fn resolve_rule_based(
    wage: Decimal,
    rules: &BTreeMap<String, ComponentRule>,
    deduction_rate: Decimal,
    fixed_deduction: Decimal,
) -> ResolveOutcome {
    let mut warnings = Vec::new();

    // Step 1: basic. Malformed rules fall back to the default share.
    let basic = match rules.get(BASIC) {
        Some(ComponentRule::PercentageOfWage(value)) => percent_of(wage, *value),
        Some(ComponentRule::FixedAmount(value)) => round_money(*value),
        _ => percent_of(wage, Decimal::from(DEFAULT_BASIC_PERCENT)),
    };

    // Step 2: named components in canonical order. Missing rules are
    // skipped and contribute nothing.
    let mut allowances: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut running_total = basic;
    for key in ordered_component_keys(rules) {
        let Some(rule) = rules.get(&key) else {
            continue;
        };
        let amount = match rule {
            ComponentRule::PercentageOfWage(value) => percent_of(wage, *value),
            ComponentRule::PercentageOfBasic(value) => percent_of(basic, *value),
            ComponentRule::FixedAmount(value) => round_money(*value),
            // Only meaningful for the catch-all; skipped elsewhere.
            ComponentRule::RemainingAmount => continue,
        };
        running_total += amount;
        allowances.insert(key, amount);
    }

    // Step 3: the catch-all, resolved last.
    if let Some(rule) = rules.get(FIXED_ALLOWANCE) {
        let amount = match rule {
            ComponentRule::RemainingAmount => {
                let remaining = wage - running_total;
                if remaining < Decimal::ZERO {
                    Decimal::ZERO
                } else {
                    round_money(remaining)
                }
            }
            ComponentRule::PercentageOfWage(value) => percent_of(wage, *value),
            ComponentRule::PercentageOfBasic(value) => percent_of(basic, *value),
            ComponentRule::FixedAmount(value) => round_money(*value),
        };
        running_total += amount;
        allowances.insert(FIXED_ALLOWANCE.to_string(), amount);
    }

    // Step 4: reconciliation. Only the catch-all is ever reduced; whatever
    // it cannot absorb becomes a conservation warning.
    if running_total > wage + EPSILON {
        let excess = running_total - wage;
        if let Some(catch_all) = allowances.get_mut(FIXED_ALLOWANCE) {
            let cut = excess.min(*catch_all);
            *catch_all -= cut;
            running_total -= cut;
        }
        if running_total > wage + EPSILON {
            warnings.push(ResolveWarning::OverAllocated {
                excess: running_total - wage,
            });
        }
    }

    // Step 5: derivation.
    let gross_monthly = wage;
    let deduction = percent_of(basic, deduction_rate);
    let breakdown = ComputedBreakdown {
        basic,
        allowances,
        gross_monthly,
        gross_yearly: gross_monthly * Decimal::from(12),
        deduction_employee: deduction,
        deduction_employer: deduction,
        fixed_deduction,
        net_salary: round_money(gross_monthly - deduction - fixed_deduction),
    };

    ResolveOutcome {
        breakdown,
        warnings,
    }
}
