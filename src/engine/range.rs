//! Range bounds and numeric conversion for range checks.

use std::cmp::Ordering;

use crate::value::ToValue;

/// Inclusivity of each end of a range. The default is `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub low_inclusive: bool,
    pub high_inclusive: bool,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            low_inclusive: true,
            high_inclusive: false,
        }
    }
}

impl Bounds {
    pub fn new(low_inclusive: bool, high_inclusive: bool) -> Self {
        Self {
            low_inclusive,
            high_inclusive,
        }
    }

    /// Whether `actual` lies between `low` and `high` under `cmp`. Incomparable values are outside.
    pub fn contains<T>(&self, actual: &T, low: &T, high: &T, cmp: impl Fn(&T, &T) -> Option<Ordering>) -> bool {
        let above_low = match cmp(actual, low) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => self.low_inclusive,
            _ => false,
        };
        let below_high = match cmp(actual, high) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.high_inclusive,
            _ => false,
        };
        above_low && below_high
    }

    /// Bracket notation of the range, e.g. `[1, 10)`.
    pub fn render(&self, low: &str, high: &str) -> String {
        let open = if self.low_inclusive { '[' } else { '(' };
        let close = if self.high_inclusive { ']' } else { ')' };
        format!("{open}{low}, {high}{close}")
    }
}

/// Numbers compared by value in numeric range checks, whatever their representation.
pub trait Numeric: ToValue {
    fn to_f64(&self) -> f64;
}

macro_rules! numeric_lossless {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn to_f64(&self) -> f64 {
                    f64::from(*self)
                }
            }
        )*
    };
}

numeric_lossless!(i8, i16, i32, u8, u16, u32, f32, f64);

macro_rules! numeric_wide {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn to_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

numeric_wide!(i64, u64, isize, usize);
