#![forbid(unsafe_code)]
//! nutest: a programmatic test harness
//!
//! nutest evaluates checks about program behavior, resolves and invokes methods by name and argument types, keeps
//! a per-run ledger of pass/fail narratives and renders reports. Subjects opt in with `#[subject]` on an inherent
//! `impl` block; test methods take a [`Tester`].
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Subject code**: panics inside invoked methods and test methods are expected input. They are caught at the
//!   invoker and orchestrator boundaries and become faults; [`fault::Fault::raise`] uses this to raise typed faults.
//!
//! - **True invariants**: If a panic represents a harness bug (logic error), use `.expect("...")` with a clear
//!   explanation.
//!
//! ## Examples
//! ```rust
//! use nutest::{Record, Tester, subject};
//!
//! #[derive(Debug, Clone, PartialEq, Record)]
//! struct Counter {
//!     start: i32,
//! }
//!
//! #[subject]
//! impl Counter {
//!     fn bumped(&self, by: i32) -> i32 {
//!         self.start + by
//!     }
//!
//!     fn test_bump(&self, t: &mut Tester) {
//!         t.check_invoke(self, "bumped", &nutest::args![2], 3);
//!     }
//! }
//!
//! assert!(nutest::run_report(&Counter { start: 1 }, false, false));
//! ```

extern crate self as nutest;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod demos;
pub mod diagnostics;
pub mod engine;
pub mod equality;
pub mod fault;
pub mod ledger;
pub mod orchestrator;
pub mod printer;
pub mod reflect;
pub mod report;
pub mod value;
pub mod version;

pub use nutest_core::types;

pub use nutest_derive::{Record, subject};

pub use engine::Tester;
pub use fault::{Fault, FaultDescriptor};
pub use orchestrator::{Orchestrator, RunOutcome, run, run_full_report, run_report};
pub use reflect::{Examples, Reflect};
pub use value::{ToValue, Value};
