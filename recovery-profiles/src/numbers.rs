//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// 2^63, the first f64 past `i64::MAX`; `i64::MAX as f64` rounds up to it.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Clamp a f64 into the i64 range, returning 0 for non-finite values.
///
/// The input is expected to be rounded already; any fraction is truncated.
#[must_use]
pub fn clamp_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    if value >= I64_UPPER_BOUND {
        return i64::MAX;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    cast::<f64, i64>(value.max(min)).unwrap_or(i64::MIN)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Finite, non-negative real number check used for consumable values.
#[must_use]
pub fn is_non_negative_real(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
