//! Legacy wage resolution.
//!
//! Tenants that predate the rule-based schema store a fixed basic amount
//! and a map of named allowance amounts. Those values are used verbatim,
//! with the historical key spellings folded into the canonical component
//! names. Legacy tenants must never see a negative net salary.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::ComputedBreakdown;
use crate::money::{percent_of, round_money};

use super::ResolveOutcome;
use super::components::canonical_key;

/// Resolves a legacy configuration into a breakdown.
///
/// `gross_monthly` is the wage when positive, otherwise the sum of the
/// stored components (very old records carry amounts but no wage). Net
/// salary is floor-clamped at zero.
pub fn resolve_legacy(
    wage: Decimal,
    basic: Decimal,
    allowances: &BTreeMap<String, Decimal>,
    deduction_rate: Decimal,
    fixed_deduction: Decimal,
) -> ResolveOutcome {
    // Different historical spellings of the same component fold together.
    let mut normalized: BTreeMap<String, Decimal> = BTreeMap::new();
    for (key, amount) in allowances {
        *normalized
            .entry(canonical_key(key))
            .or_insert(Decimal::ZERO) += *amount;
    }

    let components_total = basic + normalized.values().copied().sum::<Decimal>();
    let gross_monthly = if wage > Decimal::ZERO {
        wage
    } else {
        components_total
    };

    let deduction = percent_of(basic, deduction_rate);
    let net = round_money(gross_monthly - deduction - fixed_deduction);
    let net_salary = if net < Decimal::ZERO {
        Decimal::ZERO
    } else {
        net
    };

    ResolveOutcome {
        breakdown: ComputedBreakdown {
            basic,
            allowances: normalized,
            gross_monthly,
            gross_yearly: gross_monthly * Decimal::from(12),
            deduction_employee: deduction,
            deduction_employer: deduction,
            fixed_deduction,
            net_salary,
        },
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn allowances(entries: &[(&str, &str)]) -> BTreeMap<String, Decimal> {
        entries
            .iter()
            .map(|(key, amount)| (key.to_string(), dec(amount)))
            .collect()
    }

    #[test]
    fn test_stored_amounts_used_verbatim() {
        let allowances = allowances(&[("hra", "8000"), ("fixedAllowance", "4000")]);
        let outcome = resolve_legacy(dec("32000"), dec("20000"), &allowances, dec("12"), dec("200"));

        assert_eq!(outcome.breakdown.basic, dec("20000"));
        assert_eq!(outcome.breakdown.allowances["hra"], dec("8000"));
        assert_eq!(outcome.breakdown.allowances["fixed_allowance"], dec("4000"));
        assert_eq!(outcome.breakdown.gross_monthly, dec("32000"));
        assert_eq!(outcome.breakdown.deduction_employee, dec("2400"));
        assert_eq!(outcome.breakdown.net_salary, dec("29400"));
    }

    #[test]
    fn test_gross_falls_back_to_component_sum_when_wage_zero() {
        let allowances = allowances(&[("houseRentAllowance", "5000")]);
        let outcome = resolve_legacy(Decimal::ZERO, dec("15000"), &allowances, dec("0"), dec("0"));

        assert_eq!(outcome.breakdown.gross_monthly, dec("20000"));
        assert_eq!(outcome.breakdown.gross_yearly, dec("240000"));
    }

    #[test]
    fn test_historical_spellings_fold_into_one_key() {
        let allowances = allowances(&[("houseRentAllowance", "3000"), ("hra", "2000")]);
        let outcome = resolve_legacy(dec("20000"), dec("10000"), &allowances, dec("0"), dec("0"));

        assert_eq!(outcome.breakdown.allowances.len(), 1);
        assert_eq!(outcome.breakdown.allowances["hra"], dec("5000"));
    }

    #[test]
    fn test_net_salary_floor_clamped_at_zero() {
        let outcome = resolve_legacy(
            dec("1000"),
            dec("1000"),
            &BTreeMap::new(),
            dec("12"),
            dec("2000"),
        );
        assert_eq!(outcome.breakdown.net_salary, Decimal::ZERO);
    }

    #[test]
    fn test_legacy_never_warns() {
        let outcome = resolve_legacy(
            dec("1000"),
            dec("5000"),
            &BTreeMap::new(),
            dec("12"),
            dec("0"),
        );
        assert!(outcome.warnings.is_empty());
    }
}
