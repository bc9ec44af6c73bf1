//! Equality service consulted by every comparing check.
//!
//! The harness never compares values itself; it asks an [`EqualityService`]. The default,
//! [`StructuralEquality`], compares value graphs field by field and numbers by value.

use crate::value::Value;

/// Relative tolerance used for floating point comparison unless a run configures another.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

pub trait EqualityService {
    /// Whether `a` and `b` are the same value.
    fn same(&self, a: &Value, b: &Value) -> bool;

    /// Set the relative tolerance for inexact numbers.
    ///
    /// ## Returns
    /// - `false`, leaving the current tolerance untouched, when `epsilon` is not positive.
    fn set_tolerance(&mut self, epsilon: f64) -> bool;

    fn tolerance(&self) -> f64;
}

/// Structural equality over [`Value`]s.
///
/// ## Notes
/// - Boxed and unboxed forms of a value are the same value.
/// - Integers compare by value across widths (`Byte(3)` is the same as `Long(3)`).
/// - Floats (either width) compare within the relative tolerance; an integer is never the same as a float.
/// - Lists and records compare element-wise; records also compare class and field names.
#[derive(Debug, Clone)]
pub struct StructuralEquality {
    tolerance: f64,
}

impl StructuralEquality {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn approx(&self, a: f64, b: f64) -> bool {
        if a == b || (a.is_nan() && b.is_nan()) {
            return true;
        }
        (a - b).abs() <= self.tolerance * a.abs().max(b.abs())
    }

    fn inexact(value: &Value) -> Option<f64> {
        match *value {
            Value::Float(v) => Some(f64::from(v)),
            Value::Double(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for StructuralEquality {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl EqualityService for StructuralEquality {
    fn same(&self, a: &Value, b: &Value) -> bool {
        match (a.unboxed(), b.unboxed()) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Char(x), Value::Char(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Opaque(x), Value::Opaque(y)) => x == y,
            (Value::List(xs), Value::List(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| self.same(x, y))
            }
            (
                Value::Record { class: c1, fields: f1 },
                Value::Record { class: c2, fields: f2 },
            ) => {
                c1 == c2
                    && f1.len() == f2.len()
                    && f1
                        .iter()
                        .zip(f2)
                        .all(|((n1, v1), (n2, v2))| n1 == n2 && self.same(v1, v2))
            }
            (x, y) => match (x.as_i64(), y.as_i64()) {
                (Some(i), Some(j)) => i == j,
                _ => match (Self::inexact(x), Self::inexact(y)) {
                    (Some(p), Some(q)) => self.approx(p, q),
                    _ => false,
                },
            },
        }
    }

    fn set_tolerance(&mut self, epsilon: f64) -> bool {
        if epsilon > 0.0 {
            self.tolerance = epsilon;
            true
        } else {
            false
        }
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }
}
