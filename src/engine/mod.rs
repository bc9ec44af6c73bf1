//! The assertion engine.
//!
//! A [`Tester`] is handed to every test method. Each check it offers evaluates one condition, produces a
//! [`TestOutcome`], appends the outcome's narrative to the run's [`RunLedger`] and returns the verdict.
//!
//! ## Check families
//!
//! - Direct equality: [`Tester::check_expect`], [`Tester::check`], [`Tester::success`], [`Tester::fail`]
//! - Method invocation: [`Tester::check_invoke`], [`Tester::check_fault`]
//! - Membership: [`Tester::check_one_of`], [`Tester::check_none_of`]
//! - Ranges: [`Tester::check_num_range`], [`Tester::check_range`], [`Tester::check_range_by`] and their `_with`
//!   forms taking explicit inclusivity
//! - Negation: [`Tester::check_fail`], [`Tester::check_fail_bool`], [`Tester::check_range_fail`]
//!
//! ## Notes
//! - Every check records exactly one ledger entry, so after `n` checks `test_count == n`.
//! - Checks are `#[track_caller]`; a failing check's trace starts at the line that called it.
//! - Faults and resolution problems inside invocation checks are failures of that check, never escapes.
//!
//! ## Examples
//! ```rust
//! use nutest::Tester;
//!
//! let mut t = Tester::new();
//! assert!(t.check_expect(2 + 2, 4));
//! assert!(!t.named("off by one").check_expect(2 + 2, 5));
//! assert_eq!(t.ledger().test_count(), 2);
//! assert_eq!(t.ledger().error_count(), 1);
//! ```

pub mod outcome;
pub mod range;

use std::any::Any;
use std::cmp::Ordering;
use std::panic::Location;

use nutest_core::types::TypeDesc;

use crate::config::{ConfigError, HarnessConfig};
use crate::diagnostics::DiagnosticsFormatter;
use crate::equality::{EqualityService, StructuralEquality};
use crate::fault::{Fault, FaultDescriptor};
use crate::ledger::RunLedger;
use crate::printer::{DefaultPrinter, Printer, render_args};
use crate::reflect::invoker::{Invocation, Invoker};
use crate::reflect::resolver::MethodResolver;
use crate::reflect::{ClassInfo, Reflect};
use crate::value::{ToValue, Value};

pub use outcome::{Expected, TestOutcome};
pub use range::{Bounds, Numeric};

type Site = &'static Location<'static>;

pub struct Tester {
    ledger: RunLedger,
    equality: Box<dyn EqualityService>,
    printer: Box<dyn Printer>,
    diagnostics: DiagnosticsFormatter,
    label: Option<String>,
    last: Option<TestOutcome>,
}

impl Default for Tester {
    fn default() -> Self {
        Self::new()
    }
}

impl Tester {
    /// Name of the engine's own type, as seen by test-method discovery.
    pub const TYPE_NAME: &'static str = "Tester";

    /// A tester with the default configuration.
    pub fn new() -> Self {
        Self::configured(&HarnessConfig::default())
    }

    pub fn with_config(config: &HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::configured(config))
    }

    /// Build from a configuration that has already been validated.
    pub(crate) fn configured(config: &HarnessConfig) -> Self {
        Self {
            ledger: RunLedger::new(config.tolerance),
            equality: Box::new(StructuralEquality::new(config.tolerance)),
            printer: Box::new(DefaultPrinter),
            diagnostics: DiagnosticsFormatter::new(&config.trace),
            label: None,
            last: None,
        }
    }

    /// Replace the equality service. The ledger's tolerance follows the new service.
    pub fn with_equality(mut self, equality: Box<dyn EqualityService>) -> Self {
        self.ledger.set_tolerance(equality.tolerance());
        self.equality = equality;
        self
    }

    pub fn with_printer(mut self, printer: Box<dyn Printer>) -> Self {
        self.printer = printer;
        self
    }

    /// Label the next check.
    pub fn named(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn ledger(&self) -> &RunLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> RunLedger {
        self.ledger
    }

    /// Outcome of the most recent check.
    pub fn last_outcome(&self) -> Option<&TestOutcome> {
        self.last.as_ref()
    }

    /// Ask the equality service whether two values are the same. Records nothing.
    pub fn same(&self, a: impl ToValue, b: impl ToValue) -> bool {
        self.equality.same(&a.to_value(), &b.to_value())
    }

    /// Change the relative tolerance for inexact numbers for the rest of this run.
    ///
    /// ## Returns
    /// - `false` without changing anything when `epsilon` is not positive.
    pub fn set_tolerance(&mut self, epsilon: f64) -> bool {
        if self.equality.set_tolerance(epsilon) {
            self.ledger.set_tolerance(self.equality.tolerance());
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Direct equality
    // ========================================================================

    /// Success iff `actual` and `expected` are the same value.
    #[track_caller]
    pub fn check_expect(&mut self, actual: impl ToValue, expected: impl ToValue) -> bool {
        let (actual, expected) = (actual.to_value(), expected.to_value());
        let success = self.equality.same(&actual, &expected);
        self.conclude_values(success, Vec::new(), &actual, &expected, Location::caller())
    }

    #[track_caller]
    pub fn check(&mut self, condition: bool) -> bool {
        self.check_expect(condition, true)
    }

    #[track_caller]
    pub fn success(&mut self) -> bool {
        self.check_expect(true, true)
    }

    #[track_caller]
    pub fn fail(&mut self) -> bool {
        self.check_expect(true, false)
    }

    // ========================================================================
    // Negation
    // ========================================================================

    /// Success iff `actual` and `expected` are *not* the same value.
    #[track_caller]
    pub fn check_fail(&mut self, actual: impl ToValue, expected: impl ToValue) -> bool {
        let (actual, expected) = (actual.to_value(), expected.to_value());
        let success = !self.equality.same(&actual, &expected);
        self.conclude_values(success, vec![FAILURE_EXPECTED.to_string()], &actual, &expected, Location::caller())
    }

    #[track_caller]
    pub fn check_fail_bool(&mut self, result: bool) -> bool {
        self.check_fail(result, true)
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Success iff `actual` is the same as at least one candidate.
    #[track_caller]
    pub fn check_one_of<T: ToValue>(&mut self, actual: impl ToValue, candidates: impl IntoIterator<Item = T>) -> bool {
        let actual = actual.to_value();
        let candidates: Vec<Value> = candidates.into_iter().map(|c| c.to_value()).collect();
        let success = candidates.iter().any(|c| self.equality.same(&actual, c));
        let reason = if success {
            String::new()
        } else {
            "Actual value is not one of the expected values.".to_string()
        };
        let expected = format!("one of {}", self.printer.render(&Value::List(candidates)));
        let rendered = self.printer.render(&actual);
        self.conclude(success, vec![reason], rendered, Expected::Value(expected), Location::caller())
    }

    /// Success iff `actual` is the same as none of the candidates.
    #[track_caller]
    pub fn check_none_of<T: ToValue>(&mut self, actual: impl ToValue, candidates: impl IntoIterator<Item = T>) -> bool {
        let actual = actual.to_value();
        let candidates: Vec<Value> = candidates.into_iter().map(|c| c.to_value()).collect();
        let success = !candidates.iter().any(|c| self.equality.same(&actual, c));
        let reason = if success {
            String::new()
        } else {
            "Actual value matches one of the excluded values.".to_string()
        };
        let expected = format!("none of {}", self.printer.render(&Value::List(candidates)));
        let rendered = self.printer.render(&actual);
        self.conclude(success, vec![reason], rendered, Expected::Value(expected), Location::caller())
    }

    // ========================================================================
    // Ranges
    // ========================================================================

    /// Numeric range check over `[low, high)`, comparing by value across representations.
    #[track_caller]
    pub fn check_num_range(&mut self, actual: impl Numeric, low: impl Numeric, high: impl Numeric) -> bool {
        self.check_num_range_with(actual, low, high, true, false)
    }

    #[track_caller]
    pub fn check_num_range_with(
        &mut self,
        actual: impl Numeric,
        low: impl Numeric,
        high: impl Numeric,
        low_inclusive: bool,
        high_inclusive: bool,
    ) -> bool {
        let bounds = Bounds::new(low_inclusive, high_inclusive);
        let inside = bounds.contains(&actual.to_f64(), &low.to_f64(), &high.to_f64(), |a, b| a.partial_cmp(b));
        let rendered = [actual.to_value(), low.to_value(), high.to_value()];
        self.conclude_range(inside, false, bounds, &rendered, Location::caller())
    }

    /// Range check over `[low, high)` using the natural ordering.
    #[track_caller]
    pub fn check_range<T: PartialOrd + ToValue>(&mut self, actual: T, low: T, high: T) -> bool {
        self.check_range_with(actual, low, high, true, false)
    }

    #[track_caller]
    pub fn check_range_with<T: PartialOrd + ToValue>(
        &mut self,
        actual: T,
        low: T,
        high: T,
        low_inclusive: bool,
        high_inclusive: bool,
    ) -> bool {
        let bounds = Bounds::new(low_inclusive, high_inclusive);
        let inside = bounds.contains(&actual, &low, &high, |a, b| a.partial_cmp(b));
        let rendered = [actual.to_value(), low.to_value(), high.to_value()];
        self.conclude_range(inside, false, bounds, &rendered, Location::caller())
    }

    /// Range check over `[low, high)` using a supplied comparator.
    #[track_caller]
    pub fn check_range_by<T: ToValue>(
        &mut self,
        actual: T,
        low: T,
        high: T,
        comparator: impl Fn(&T, &T) -> Ordering,
    ) -> bool {
        self.check_range_by_with(actual, low, high, comparator, true, false)
    }

    #[track_caller]
    pub fn check_range_by_with<T: ToValue>(
        &mut self,
        actual: T,
        low: T,
        high: T,
        comparator: impl Fn(&T, &T) -> Ordering,
        low_inclusive: bool,
        high_inclusive: bool,
    ) -> bool {
        let bounds = Bounds::new(low_inclusive, high_inclusive);
        let inside = bounds.contains(&actual, &low, &high, |a, b| Some(comparator(a, b)));
        let rendered = [actual.to_value(), low.to_value(), high.to_value()];
        self.conclude_range(inside, false, bounds, &rendered, Location::caller())
    }

    /// Success iff `actual` lies *outside* `[low, high)`.
    #[track_caller]
    pub fn check_range_fail<T: PartialOrd + ToValue>(&mut self, actual: T, low: T, high: T) -> bool {
        let bounds = Bounds::default();
        let inside = bounds.contains(&actual, &low, &high, |a, b| a.partial_cmp(b));
        let rendered = [actual.to_value(), low.to_value(), high.to_value()];
        self.conclude_range(inside, true, bounds, &rendered, Location::caller())
    }

    // ========================================================================
    // Method invocation
    // ========================================================================

    /// Resolve `method` on `subject` by the argument types, invoke it, and compare its result with `expected`.
    ///
    /// A method that cannot be resolved, or that faults, fails the check.
    #[track_caller]
    pub fn check_invoke<S: Reflect>(
        &mut self,
        subject: &S,
        method: &str,
        args: &[Value],
        expected: impl ToValue,
    ) -> bool {
        let site = Location::caller();
        let class = S::class_info();
        let expected = expected.to_value();
        let mut parts = self.invocation_context(subject, class, method, args);

        match self.call(class, subject, method, args) {
            Err(failure) => {
                parts.push(failure.reason);
                let rendered = self.printer.render(&expected);
                self.conclude(false, parts, failure.actual, Expected::Value(rendered), site)
            }
            Ok(Invocation::Faulted(fault)) => {
                parts.push(format!("method {method} raised a fault"));
                let rendered = self.printer.render(&expected);
                self.conclude(false, parts, fault.descriptor().to_string(), Expected::Value(rendered), site)
            }
            Ok(Invocation::Returned(actual)) => {
                let success = self.equality.same(&actual, &expected);
                self.conclude_values(success, parts, &actual, &expected, site)
            }
        }
    }

    /// Resolve and invoke `method` on `subject`, expecting it to raise `expected`.
    ///
    /// Success iff the observed fault's kind and message both equal the expected ones exactly.
    #[track_caller]
    pub fn check_fault<S: Reflect>(
        &mut self,
        expected: impl Into<FaultDescriptor>,
        subject: &S,
        method: &str,
        args: &[Value],
    ) -> bool {
        let site = Location::caller();
        let class = S::class_info();
        let expected = expected.into();
        let mut parts = self.invocation_context(subject, class, method, args);

        match self.call(class, subject, method, args) {
            Err(failure) => {
                parts.push(failure.reason);
                self.conclude(false, parts, failure.actual, Expected::Value(expected.to_string()), site)
            }
            Ok(Invocation::Returned(value)) => {
                parts.push(format!(
                    "no fault raised by method {method} in the class {}",
                    class.name
                ));
                let actual = self.printer.render(&value);
                let wanted = format!("fault expected: {expected}");
                self.conclude(false, parts, actual, Expected::Value(wanted), site)
            }
            Ok(Invocation::Faulted(fault)) => {
                let observed = fault.descriptor();
                if observed.kind_name != expected.kind_name {
                    parts.push("wrong kind of fault".to_string());
                    let actual = format!("fault raised:   {}", observed.kind_name);
                    let wanted = format!("fault expected: {}", expected.kind_name);
                    self.conclude(false, parts, actual, Expected::Value(wanted), site)
                } else if observed.message != expected.message {
                    parts.push(format!("correct fault: {}\nwrong message", observed.kind_name));
                    let actual = format!("message produced: {}", observed.message_text());
                    let wanted = format!("message expected: {}", expected.message_text());
                    self.conclude(false, parts, actual, Expected::Value(wanted), site)
                } else {
                    self.conclude(true, parts, observed.to_string(), Expected::Value(expected.to_string()), site)
                }
            }
        }
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Record a fault that escaped a test method body.
    pub(crate) fn record_escape(&mut self, class: &str, method: &str, fault: &Fault) -> bool {
        let label = join_parts(self.take_label(), [format!(
            "fault escaped from test method {method} in the class {class}; remaining test methods were not run"
        )]);
        let outcome = TestOutcome {
            success: false,
            label,
            actual: fault.descriptor().to_string(),
            expected: Expected::Value("no fault".to_string()),
            trace: self.diagnostics.capture_fault(fault),
        };
        self.record(outcome)
    }

    fn invocation_context<S: Reflect>(&self, subject: &S, class: &ClassInfo, method: &str, args: &[Value]) -> Vec<String> {
        let mut parts = vec![format!("invoked method {method} in the class {}", class.name)];
        if !args.is_empty() {
            parts.push(format!("with arguments {}", render_args(self.printer.as_ref(), args)));
        }
        let inspected = subject.inspect();
        if !matches!(inspected, Value::Opaque(_)) {
            parts.push(format!("on {}", self.printer.render(&inspected)));
        }
        parts
    }

    fn call(&self, class: &ClassInfo, subject: &dyn Any, method: &str, args: &[Value]) -> Result<Invocation, CallFailure> {
        let arg_types: Vec<TypeDesc> = args.iter().map(Value::type_desc).collect();
        let handle = MethodResolver::resolve(class, method, &arg_types).map_err(|err| CallFailure {
            reason: err.to_string(),
            actual: format!(
                "Failed to invoke method {}.{}{}",
                class.name,
                method,
                nutest_core::types::render_list(&arg_types)
            ),
        })?;
        Ok(Invoker::invoke(&handle, subject, args))
    }

    fn conclude_values(&mut self, success: bool, parts: Vec<String>, actual: &Value, expected: &Value, site: Site) -> bool {
        let actual = self.printer.render(actual);
        let expected = Expected::Value(self.printer.render(expected));
        self.conclude(success, parts, actual, expected, site)
    }

    fn conclude_range(&mut self, inside: bool, negated: bool, bounds: Bounds, values: &[Value; 3], site: Site) -> bool {
        let [actual, low, high] = values;
        let (actual, low, high) = (
            self.printer.render(actual),
            self.printer.render(low),
            self.printer.render(high),
        );
        let mut parts = Vec::new();
        if negated {
            parts.push(FAILURE_EXPECTED.to_string());
        }
        if !inside {
            parts.push(format!(
                "Actual value is not within the {} range.",
                bounds.render(&low, &high)
            ));
        }
        self.conclude(inside != negated, parts, actual, Expected::Range { low, high }, site)
    }

    /// Build the outcome of a check and record it. The user label (if any) leads the label lines.
    fn conclude(&mut self, success: bool, parts: Vec<String>, actual: String, expected: Expected, site: Site) -> bool {
        let label = match parts.first().map(String::as_str) {
            // "Failure expected:" always heads the label of a negated check.
            Some(FAILURE_EXPECTED) => {
                let mut rest = parts.into_iter();
                let head = rest.next();
                join_parts(head, std::iter::once(self.take_label().unwrap_or_default()).chain(rest))
            }
            _ => join_parts(self.take_label(), parts),
        };
        let trace = if success {
            String::new()
        } else {
            self.diagnostics.capture(site)
        };
        self.record(TestOutcome {
            success,
            label,
            actual,
            expected,
            trace,
        })
    }

    fn record(&mut self, outcome: TestOutcome) -> bool {
        let narrative = outcome.narrative(self.ledger.next_test_number());
        let verdict = if outcome.success {
            self.ledger.record_success(&narrative)
        } else {
            self.ledger.record_failure(&narrative)
        };
        tracing::trace!(number = self.ledger.test_count(), success = outcome.success, "check recorded");
        self.last = Some(outcome);
        verdict
    }

    fn take_label(&mut self) -> Option<String> {
        self.label.take()
    }
}

const FAILURE_EXPECTED: &str = "Failure expected:";

struct CallFailure {
    reason: String,
    actual: String,
}

fn join_parts(head: Option<String>, rest: impl IntoIterator<Item = String>) -> String {
    outcome::join_label(head.into_iter().chain(rest))
}

impl std::fmt::Debug for Tester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tester")
            .field("ledger", &self.ledger)
            .field("tolerance", &self.equality.tolerance())
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
