//! Fixed-point helpers for per-account precision.
//!
//! Amounts are `rust_decimal::Decimal` throughout. Each account fixes its own
//! number of digits, so rounding and formatting take the precision as an
//! argument instead of baking it into a type.

use rust_decimal::{Decimal, RoundingStrategy};

/// Precision given to accounts created without an explicit one.
pub const DEFAULT_DIGITS: u32 = 2;

/// Largest scale `rust_decimal` can represent.
pub const MAX_DIGITS: u32 = 28;

/// Rounds `value` to `digits` places, exact halves away from zero.
///
/// ```
/// use std::str::FromStr;
/// use rust_decimal::Decimal;
/// use tally::decimal::round_half_up;
///
/// let v = Decimal::from_str("1.005").unwrap();
/// assert_eq!(round_half_up(v, 2).to_string(), "1.01");
/// ```
pub fn round_half_up(value: Decimal, digits: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(digits);
    rounded
}

/// Formats `value` with exactly `digits` places after the decimal point.
pub fn format_fixed(value: Decimal, digits: u32) -> String {
    round_half_up(value, digits).to_string()
}
