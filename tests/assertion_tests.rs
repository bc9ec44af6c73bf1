//! Check behavior seen from a test author's side: verdicts, ledger effects and narrative content.

use nutest::config::{HarnessConfig, TraceConfig};
use nutest::engine::Expected;
use nutest::fault::{Fault, FaultDescriptor};
use nutest::{Record, Tester, args, subject};

fn quiet() -> Tester {
    Tester::with_config(&HarnessConfig::default().with_trace(TraceConfig::disabled())).unwrap()
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Parser {
    strict: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("unexpected token `{0}`")]
struct SyntaxError(String);

#[subject(inspect)]
impl Parser {
    fn parse(&self, input: &str) -> Result<i32, SyntaxError> {
        input.trim().parse().map_err(|_| SyntaxError(input.to_string()))
    }

    fn reject(&self, input: &str) -> i32 {
        if self.strict {
            Fault::raise("IllegalState", "bad input");
        }
        input.len() as i32
    }

    fn explode(&self) -> i32 {
        panic!("parser state corrupted")
    }
}

// =============================================================================
// Direct equality
// =============================================================================

#[test]
fn test_equal_values_pass_and_different_values_fail() {
    let mut t = quiet();
    assert!(t.check_expect("abc", "abc"));
    assert!(t.check_expect(vec![1, 2], [1, 2]));
    assert!(!t.check_expect(3, 4));

    let narrative = t.ledger().summary();
    assert!(narrative.contains("actual:     3\n"));
    assert!(narrative.contains("expected:   4\n"));
    assert_eq!(t.ledger().test_count(), 3);
    assert_eq!(t.ledger().error_count(), 1);
}

#[test]
fn test_boolean_sugar() {
    let mut t = quiet();
    assert!(t.success());
    assert!(!t.fail());
    assert!(t.check(1 < 2));
    assert!(t.check_fail_bool(false));
}

#[test]
fn test_integers_compare_across_widths_but_not_against_floats() {
    let mut t = quiet();
    assert!(t.check_expect(3i8, 3i64));
    assert!(!t.check_expect(3, 3.0));
}

// =============================================================================
// Ranges and membership
// =============================================================================

#[test]
fn test_range_bounds() {
    let mut t = quiet();
    assert!(t.check_range(5, 1, 10));
    assert!(!t.check_range(10, 1, 10));
    assert!(t.check_range_with(10, 1, 10, true, true));
    assert!(!t.check_range_with(1, 1, 10, false, true));
    assert_eq!(
        t.last_outcome().unwrap().label,
        "Actual value is not within the (1, 10] range."
    );
}

#[test]
fn test_num_range_compares_by_value() {
    let mut t = quiet();
    assert!(t.check_num_range(3, 1.0, 5i64));
    assert!(t.check_num_range(2.5f32, 1u8, 3usize));
    assert!(!t.check_num_range(5, 1, 5.0));
    assert!(t.check_num_range_with(5, 1, 5.0, true, true));
    assert_eq!(
        t.last_outcome().unwrap().expected,
        Expected::Range {
            low: "1".to_string(),
            high: "5.0".to_string()
        }
    );
}

#[test]
fn test_negated_range() {
    let mut t = quiet();
    assert!(t.check_range_fail(10, 1, 10));
    assert!(!t.check_range_fail(3, 1, 10));
    assert!(t.last_outcome().unwrap().label.starts_with("Failure expected:"));
}

#[test]
fn test_membership() {
    let mut t = quiet();
    assert!(t.check_one_of("b", ["a", "b"]));
    assert!(!t.check_one_of(9, [1, 2]));
    assert_eq!(t.last_outcome().unwrap().expected, Expected::Value("one of [1, 2]".to_string()));
    assert!(t.check_none_of(9, [1, 2]));
    assert!(!t.check_none_of(1, [1, 2]));
}

// =============================================================================
// Invocation
// =============================================================================

#[test]
fn test_invoke_compares_returned_value() {
    let mut t = quiet();
    let parser = Parser { strict: false };
    assert!(t.check_invoke(&parser, "parse", &args!["42"], 42));
    assert!(!t.check_invoke(&parser, "parse", &args!["42"], 41));
    let label = &t.last_outcome().unwrap().label;
    assert!(label.contains("invoked method parse in the class Parser"));
    assert!(label.contains("with arguments \"42\""));
    assert!(label.contains("on Parser { strict: false }"));
}

#[test]
fn test_invoke_fault_is_a_failure_not_an_escape() {
    let mut t = quiet();
    let parser = Parser { strict: false };
    assert!(!t.check_invoke(&parser, "parse", &args!["x"], 1));
    assert_eq!(t.last_outcome().unwrap().actual, "SyntaxError: unexpected token `x`");

    assert!(!t.check_invoke(&parser, "explode", &args![], 0));
    assert_eq!(t.last_outcome().unwrap().actual, "panic: parser state corrupted");
    assert!(t.last_outcome().unwrap().label.contains("method explode raised a fault"));
    assert_eq!(t.ledger().error_count(), 2);
}

#[test]
fn test_unresolvable_method_fails_the_check() {
    let mut t = quiet();
    let parser = Parser { strict: false };
    assert!(!t.check_invoke(&parser, "parse", &args![42], 42));
    let outcome = t.last_outcome().unwrap();
    assert_eq!(outcome.actual, "Failed to invoke method Parser.parse(i32)");
    assert!(outcome.label.contains("method `parse` in the class Parser has no signature matching parse(i32)"));

    assert!(!t.check_invoke(&parser, "missing", &args![], 0));
    assert!(t.last_outcome().unwrap().label.contains("no method named `missing` in the class Parser"));
}

// =============================================================================
// Fault expectation
// =============================================================================

#[test]
fn test_expected_fault_matches_kind_and_message() {
    let mut t = quiet();
    let strict = Parser { strict: true };
    assert!(t.check_fault(("IllegalState", "bad input"), &strict, "reject", &args!["x"]));
}

#[test]
fn test_wrong_message_reports_both_messages() {
    let mut t = quiet();
    let strict = Parser { strict: true };
    assert!(!t.check_fault(("IllegalState", "Bad input"), &strict, "reject", &args!["x"]));
    let outcome = t.last_outcome().unwrap();
    assert_eq!(outcome.actual, "message produced: bad input");
    assert_eq!(outcome.expected, Expected::Value("message expected: Bad input".to_string()));
}

#[test]
fn test_wrong_kind_reports_both_kinds() {
    let mut t = quiet();
    let strict = Parser { strict: true };
    assert!(!t.check_fault(("IllegalArgument", "bad input"), &strict, "reject", &args!["x"]));
    let outcome = t.last_outcome().unwrap();
    assert_eq!(outcome.actual, "fault raised:   IllegalState");
    assert_eq!(outcome.expected, Expected::Value("fault expected: IllegalArgument".to_string()));
}

#[test]
fn test_normal_return_is_reported_as_no_fault_raised() {
    let mut t = quiet();
    let lenient = Parser { strict: false };
    assert!(!t.check_fault(FaultDescriptor::new("IllegalState", "bad input"), &lenient, "reject", &args!["xyz"]));
    let outcome = t.last_outcome().unwrap();
    assert!(outcome.label.contains("no fault raised by method reject in the class Parser"));
    assert_eq!(outcome.actual, "3");
    assert_eq!(
        outcome.expected,
        Expected::Value("fault expected: IllegalState: bad input".to_string())
    );
}

#[test]
fn test_error_values_become_faults_named_after_their_type() {
    let mut t = quiet();
    let parser = Parser { strict: false };
    assert!(t.check_fault(
        ("SyntaxError", "unexpected token `?`"),
        &parser,
        "parse",
        &args!["?"]
    ));
}

// =============================================================================
// Tolerance
// =============================================================================

#[test]
fn test_tolerance_is_scoped_to_the_tester() {
    let mut loose = quiet();
    assert!(!loose.set_tolerance(0.0));
    assert!(loose.set_tolerance(0.05));
    assert!(loose.check_expect(1.0, 1.04));

    let mut strict = quiet();
    assert!(!strict.check_expect(1.0, 1.04));
    assert!(strict.same(1.0, 1.0005));
}
