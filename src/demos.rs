//! Bundled example subjects run by the `nutest` binary.
//!
//! Each subject shows one way of exposing tests:
//! - [`Examples`]: convention discovery (`test` prefix) plus an explicitly marked method
//! - [`Account`]: method-invocation and fault-expectation checks against its own methods
//! - [`Circle`]: methods inherited from [`Shape`], with one override
//! - [`Shapes`]: a single aggregate entry point, which replaces convention discovery

use std::f64::consts::PI;

use thiserror::Error;

use crate::catalog::ExampleCatalog;
use crate::reflect;
use crate::{Record, Tester, args, subject};

// ============================================================================
// Convention discovery
// ============================================================================

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Examples {
    pub numbers: Vec<i32>,
    pub ratio: f64,
}

impl Default for Examples {
    fn default() -> Self {
        Self {
            numbers: vec![3, 1, 2],
            ratio: 0.5,
        }
    }
}

#[subject(inspect)]
impl Examples {
    pub fn sum(&self) -> i32 {
        self.numbers.iter().sum()
    }

    fn test_arithmetic(&self, t: &mut Tester) {
        t.check_expect(2 + 2, 4);
        t.check_expect(self.sum(), 6);
        t.check_num_range(3, 1.0, 5u8);
        t.check_one_of(self.numbers[0], [1, 2, 3]);
        t.check_none_of(7, self.numbers.clone());
    }

    fn test_inexact(&self, t: &mut Tester) {
        t.named("within the default tolerance").check_expect(self.ratio * 3.0, 1.5005);
        t.check_fail(self.ratio, 0.6);
        t.check_range_fail(self.ratio, 1.0, 2.0);
    }

    #[test_method]
    fn ordering(&self, t: &mut Tester) {
        let mut sorted = self.numbers.clone();
        sorted.sort_unstable();
        t.check_expect(sorted, vec![1, 2, 3]);
        t.check_range_by("pear", "fig", "quince", |a, b| a.len().cmp(&b.len()));
        t.check_range_with('z', 'a', 'z', true, true);
    }
}

// ============================================================================
// Invocation and faults
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
#[error("balance {balance} cannot cover {amount}")]
pub struct InsufficientFunds {
    pub balance: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Account {
    pub owner: String,
    pub balance: i64,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            owner: "Ada".to_string(),
            balance: 100,
        }
    }
}

#[subject(inspect)]
impl Account {
    pub fn deposit(&self, amount: i64) -> i64 {
        self.balance + amount
    }

    pub fn withdraw(&self, amount: i64) -> Result<i64, InsufficientFunds> {
        if amount > self.balance {
            return Err(InsufficientFunds {
                balance: self.balance,
                amount,
            });
        }
        Ok(self.balance - amount)
    }

    /// Interest at `rate`; the rate is boxed so a primitive argument resolves through the compatibility table.
    pub fn interest(&self, rate: Box<f64>) -> f64 {
        self.balance as f64 * *rate
    }

    fn owner_initial(&self) -> Option<char> {
        self.owner.chars().next()
    }

    fn test_deposit(&self, t: &mut Tester) {
        t.check_expect(self.deposit(5), 105i64);
        t.check_invoke(self, "deposit", &args![20i64], 120i64);
        t.check_invoke(self, "interest", &args![0.5], 50.0);
    }

    fn test_withdraw(&self, t: &mut Tester) {
        t.check_invoke(self, "withdraw", &args![40i64], 60i64);
        t.check_fault(
            ("InsufficientFunds", "balance 100 cannot cover 500"),
            self,
            "withdraw",
            &args![500i64],
        );
    }

    #[test_method]
    fn audit(&self, t: &mut Tester) {
        t.check_range(self.balance, 0, 1_000);
        t.check_invoke(self, "owner_initial", &args![], 'A');
    }
}

// ============================================================================
// Inheritance
// ============================================================================

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Shape {
    pub label: String,
}

#[subject]
impl Shape {
    pub fn describe(&self) -> String {
        format!("shape {}", self.label)
    }

    pub fn label_length(&self) -> usize {
        self.label.len()
    }

    fn test_label(&self, t: &mut Tester) {
        t.named("shapes carry a label").check(!self.label.is_empty());
    }
}

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Circle {
    pub shape: Shape,
    pub radius: f64,
}

impl Default for Circle {
    fn default() -> Self {
        Self {
            shape: Shape {
                label: "unit".to_string(),
            },
            radius: 1.0,
        }
    }
}

#[subject(extends = Shape, via = shape, inspect)]
impl Circle {
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    pub fn describe(&self) -> String {
        format!("circle {} r={}", self.shape.label, self.radius)
    }

    fn test_area(&self, t: &mut Tester) {
        t.check_num_range(self.area(), 3.1, 3.2);
        t.check_invoke(self, "describe", &args![], "circle unit r=1");
        t.check_invoke(self, "label_length", &args![], 4usize);
    }
}

// ============================================================================
// Aggregate entry point
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Shapes {
    pub unit: Circle,
}

#[subject(examples, inspect)]
impl Shapes {}

impl reflect::Examples for Shapes {
    fn tests(&self, t: &mut Tester) {
        t.check_invoke(&self.unit, "area", &args![], PI);
        t.check_invoke(&self.unit.shape, "describe", &args![], "shape unit");
        t.check_expect(self.unit.clone(), Circle::default());
    }
}

/// Catalog of the bundled subjects. None opts in, so a bare run falls back to `Examples`.
pub fn catalog() -> ExampleCatalog {
    ExampleCatalog::new()
        .register::<Examples>("Examples", false)
        .register::<Account>("Account", false)
        .register::<Circle>("Circle", false)
        .register::<Shapes>("Shapes", false)
}
