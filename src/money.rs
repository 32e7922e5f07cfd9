//! Shared numeric utilities for monetary amounts.
//!
//! All amounts in the engine are [`rust_decimal::Decimal`] values in the
//! tenant's single configured currency. Percentages are expressed 0-100.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounding tolerance for conservation checks: one currency unit.
///
/// A breakdown whose components exceed the wage by at most this amount is
/// considered conserved; anything above it is clamped at the catch-all step.
pub const EPSILON: Decimal = Decimal::ONE;

/// Rounds a monetary amount to two decimal places, midpoint away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::money::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let amount = Decimal::from_str("10.005").unwrap();
/// assert_eq!(round_money(amount), Decimal::from_str("10.01").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Applies a 0-100 percentage to an amount, rounded to two decimal places.
///
/// # Example
///
/// ```
/// use payroll_engine::money::percent_of;
/// use rust_decimal::Decimal;
///
/// let wage = Decimal::from(50_000);
/// assert_eq!(percent_of(wage, Decimal::from(50)), Decimal::from(25_000));
/// ```
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    round_money(amount * rate / Decimal::ONE_HUNDRED)
}
