//! Scalar equality and cross-type numeric comparison.
//!
//! Without `flexible_types`, values of different kinds are never equal. With
//! it, any two numeric values (`int`, `uint`, `float32`, `float64`,
//! `complex64`, `complex128`) are equal when they denote exactly the same
//! number: no rounding, no tolerance.

use msgpackdiff_types::Value;

/// A numeric value widened to a common representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// An integer, or a float/complex that is exactly integral.
    Integer(i128),
    /// Anything else. `f32` parts are widened losslessly.
    Real { re: f64, im: f64 },
}

/// 2^64, the first magnitude outside every MessagePack integer range.
const INTEGER_LIMIT: f64 = 18_446_744_073_709_551_616.0;

impl Number {
    /// Widen a numeric value. Returns `None` for non-numeric kinds.
    pub fn from_value(value: &Value) -> Option<Self> {
        let number = match value {
            Value::Int(i) => Number::Integer(i128::from(*i)),
            Value::Uint(u) => Number::Integer(i128::from(*u)),
            Value::Float32(f) => Number::real(f64::from(*f), 0.0),
            Value::Float64(f) => Number::real(*f, 0.0),
            Value::Complex64(re, im) => Number::real(f64::from(*re), f64::from(*im)),
            Value::Complex128(re, im) => Number::real(*re, *im),
            Value::String(_)
            | Value::Binary(_)
            | Value::Map(_)
            | Value::Array(_)
            | Value::Bool(_)
            | Value::Nil
            | Value::Timestamp(_) => return None,
        };
        Some(number)
    }

    /// Normalise: a real with no imaginary part and an integral value in
    /// integer range becomes an `Integer`.
    fn real(re: f64, im: f64) -> Self {
        if im == 0.0 && re.is_finite() && re.fract() == 0.0 && re.abs() < INTEGER_LIMIT {
            Number::Integer(re as i128)
        } else {
            Number::Real { re, im }
        }
    }
}

/// Equality of two values that do not need a structural walk.
///
/// Containers always compare unequal here; the tree comparator handles them.
/// Floats use native equality, so `NaN` never equals itself.
pub fn scalar_equal(a: &Value, b: &Value, flexible_types: bool) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Binary(x), Value::Binary(y)) => x == y,
        (Value::Float32(x), Value::Float32(y)) => x == y,
        (Value::Float64(x), Value::Float64(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Uint(x), Value::Uint(y)) => x == y,
        (Value::Nil, Value::Nil) => true,
        (Value::Complex64(xr, xi), Value::Complex64(yr, yi)) => xr == yr && xi == yi,
        (Value::Complex128(xr, xi), Value::Complex128(yr, yi)) => xr == yr && xi == yi,
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        (Value::Map(_), Value::Map(_)) | (Value::Array(_), Value::Array(_)) => false,
        _ if flexible_types => flexible_equal(a, b),
        _ => false,
    }
}

/// Exact numeric equality across kinds. Non-numeric values are never equal.
pub fn flexible_equal(a: &Value, b: &Value) -> bool {
    match (Number::from_value(a), Number::from_value(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
