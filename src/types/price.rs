//! Fixed-point price and quantity utilities.
//!
//! Prices and quantities travel through the book as `u64` scaled by 10^8.
//! The book itself only compares and adds these integers; the helpers here
//! exist for the edges of the system (parsing operator input, rendering
//! the depth ladder, logging).
//!
//! ```
//! use matchbook::types::price::{to_fixed, from_fixed_trimmed};
//!
//! let price = to_fixed("400.5").unwrap();
//! assert_eq!(price, 40_050_000_000);
//! assert_eq!(from_fixed_trimmed(price), "400.5");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point values: 10^8
pub const SCALE: u64 = 100_000_000;

/// Parse a decimal string into fixed-point.
///
/// Returns `None` for negative values, unparsable input, or values that do
/// not fit in `u64` after scaling. Digits beyond the 8th decimal place are
/// rounded (banker's rounding, as `rust_decimal` does).
///
/// ```
/// use matchbook::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1"), Some(100_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("-3"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a `Decimal` to fixed-point, `None` if negative or out of range.
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }
    d.checked_mul(Decimal::from(SCALE))?.round_dp(0).to_u64()
}

/// Convert fixed-point back to an exact `Decimal`.
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Render with exactly 8 decimal places.
pub fn from_fixed(value: u64) -> String {
    format!("{:.8}", fixed_to_decimal(value))
}

/// Render without trailing zeros (`150_000_000` -> `"1.5"`).
pub fn from_fixed_trimmed(value: u64) -> String {
    fixed_to_decimal(value).normalize().to_string()
}
