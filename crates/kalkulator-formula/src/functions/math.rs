//! Math functions
//!
//! Argument counts are checked by the parser; every argument is coerced to a
//! number (`true`/`false` become 1/0).

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::EvalResult;
use crate::evaluator::Value;

fn number_arg(args: &[Value], index: usize) -> f64 {
    args.get(index).map_or(0.0, Value::as_number)
}

/// ROUND(value, [precision]) - rounds half away from zero
pub fn fn_round(args: &[Value]) -> EvalResult<Value> {
    let value = number_arg(args, 0);
    let precision = number_arg(args, 1) as i32;
    Ok(Value::Number(round_half_away(value, precision)))
}

/// Round to `precision` decimal places, halves away from zero
///
/// Positive precisions go through the decimal representation of the value so
/// that `1.955` rounds to `1.96` even though the nearest `f64` is slightly
/// below it. Negative precisions round to tens, hundreds, and so on.
pub fn round_half_away(value: f64, precision: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let precision = precision.clamp(-308, 308);
    if precision < 0 {
        let factor = 10f64.powi(-precision);
        return (value / factor).round() * factor;
    }

    let decimal_places = precision.min(28) as u32;
    if let Ok(decimal) = value.to_string().parse::<Decimal>() {
        let rounded =
            decimal.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
        if let Ok(result) = rounded.to_string().parse::<f64>() {
            return result;
        }
    }

    // Outside the decimal range
    let factor = 10f64.powi(precision);
    let scaled = value * factor;
    if !scaled.is_finite() {
        // No fractional digits left at this magnitude
        return value;
    }
    scaled.round() / factor
}

/// CEIL(value)
pub fn fn_ceil(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(number_arg(args, 0).ceil()))
}

/// FLOOR(value)
pub fn fn_floor(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(number_arg(args, 0).floor()))
}

/// ABS(value)
pub fn fn_abs(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(number_arg(args, 0).abs()))
}

/// MAX(value, ...)
pub fn fn_max(args: &[Value]) -> EvalResult<Value> {
    let max = args
        .iter()
        .map(Value::as_number)
        .fold(f64::NEG_INFINITY, f64::max);
    Ok(Value::Number(max))
}

/// MIN(value, ...)
pub fn fn_min(args: &[Value]) -> EvalResult<Value> {
    let min = args
        .iter()
        .map(Value::as_number)
        .fold(f64::INFINITY, f64::min);
    Ok(Value::Number(min))
}

/// POW(base, exponent)
pub fn fn_pow(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(number_arg(args, 0).powf(number_arg(args, 1))))
}

/// SQRT(value) - NaN for negative input
pub fn fn_sqrt(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(number_arg(args, 0).sqrt()))
}
