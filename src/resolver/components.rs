//! Canonical component names and resolution ordering.
//!
//! The resolution order of named components is an explicit constant rather
//! than map iteration order, so results do not depend on how the rule map
//! happens to iterate.

use std::collections::BTreeMap;

use crate::models::ComponentRule;

/// The basic component; always resolved first.
pub const BASIC: &str = "basic";

/// The catch-all component; always resolved last so a `remaining_amount`
/// rule can absorb whatever wage is left.
pub const FIXED_ALLOWANCE: &str = "fixed_allowance";

/// Canonical resolution order of the named allowance components, between
/// basic and the catch-all.
pub const COMPONENT_ORDER: &[&str] = &["hra", "standard_allowance", "performance_bonus", "lta"];

/// Normalizes historical key spellings to the canonical component names.
///
/// Legacy tenant data carries camelCase and long-form spellings; the
/// statement reconstructor and the legacy resolver fold them together so a
/// year of mixed-era payslips accumulates under one key per component.
///
/// # Example
///
/// ```
/// use payroll_engine::resolver::canonical_key;
///
/// assert_eq!(canonical_key("houseRentAllowance"), "hra");
/// assert_eq!(canonical_key("fixedAllowance"), "fixed_allowance");
/// assert_eq!(canonical_key("travel"), "travel");
/// ```
pub fn canonical_key(key: &str) -> String {
    match key {
        "hra" | "houseRentAllowance" | "house_rent_allowance" => "hra",
        "standardAllowance" | "specialAllowance" | "special_allowance" => "standard_allowance",
        "performanceBonus" => "performance_bonus",
        "lta" | "leaveTravelAllowance" | "leave_travel_allowance" => "lta",
        "fixedAllowance" => "fixed_allowance",
        "basicSalary" => "basic",
        other => other,
    }
    .to_string()
}

/// Returns the configured component keys in resolution order: the canonical
/// names first, then any tenant-defined extras in lexicographic order.
/// Excludes `basic` and the catch-all, which are resolved separately.
pub fn ordered_component_keys(rules: &BTreeMap<String, ComponentRule>) -> Vec<String> {
    let mut keys: Vec<String> = COMPONENT_ORDER
        .iter()
        .filter(|name| rules.contains_key(**name))
        .map(|name| name.to_string())
        .collect();

    // BTreeMap iteration is already sorted, so extras come out deterministic.
    keys.extend(
        rules
            .keys()
            .filter(|key| {
                key.as_str() != BASIC
                    && key.as_str() != FIXED_ALLOWANCE
                    && !COMPONENT_ORDER.contains(&key.as_str())
            })
            .cloned(),
    );

    keys
}
