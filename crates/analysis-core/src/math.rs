//! Numeric helpers shared by the ratio calculators.
//!
//! None of these fail: a ratio that cannot be formed is reported as 0 and
//! left for the scoring rubric to penalize.

/// Divide `numerator` by `denominator`, returning 0.0 when the quotient is
/// undefined (NaN operand, zero denominator, or a non-finite result).
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if numerator.is_nan() || denominator.is_nan() || denominator == 0.0 {
        return 0.0;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        quotient
    } else {
        0.0
    }
}

/// Compound annual growth rate in percent.
///
/// Returns 0.0 when either endpoint is non-positive or `periods` is not
/// positive: a sign flip or a zero base has no meaningful geometric rate.
pub fn cagr(start_value: f64, end_value: f64, periods: f64) -> f64 {
    if !(start_value > 0.0 && end_value > 0.0 && periods > 0.0) {
        return 0.0;
    }
    ((end_value / start_value).powf(1.0 / periods) - 1.0) * 100.0
}

/// Scaled magnitude past which `+ 0.5` is no longer exact enough to round
/// half-up; such values are returned as they are.
const MAX_EXACT_SCALED: f64 = (1u64 << 50) as f64;

/// Half-up rounding to `digits` decimal places.
///
/// Nudges by `f64::EPSILON` first so values such as 1.005 land on the
/// expected side despite their binary representation. Non-finite values and
/// values too large to hold `digits` decimals come back unchanged.
pub fn round(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_SCALED {
        return value;
    }
    ((value + f64::EPSILON) * factor + 0.5).floor() / factor
}

/// [`round`] at the two decimal places used for every reported figure.
pub fn round2(value: f64) -> f64 {
    round(value, 2)
}

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}
