//! Discovery, sequencing and escaping-fault behavior of whole runs.

use std::cell::RefCell;
use std::rc::Rc;

use nutest::config::{HarnessConfig, TraceConfig};
use nutest::fault::Fault;
use nutest::orchestrator::{Orchestrator, RunOutcome, RunReport, RunState};
use nutest::report::{RunSummary, TestReporter};
use nutest::{Examples, Tester, subject};

fn orchestrator() -> Orchestrator {
    Orchestrator::new(HarnessConfig::default().with_trace(TraceConfig::disabled())).unwrap()
}

fn reported(outcome: RunOutcome) -> RunReport {
    match outcome {
        RunOutcome::Reported(report) => report,
        RunOutcome::NoTests { class, .. } => panic!("expected {class} to run"),
    }
}

// =============================================================================
// Escaping faults
// =============================================================================

#[derive(Default)]
struct Batch {
    entered: RefCell<Vec<&'static str>>,
}

#[subject]
impl Batch {
    fn test_1(&self, t: &mut Tester) {
        self.entered.borrow_mut().push("1");
        t.success();
    }

    fn test_2(&self, t: &mut Tester) {
        self.entered.borrow_mut().push("2");
        t.check_expect(1, 2);
    }

    fn test_3(&self, t: &mut Tester) {
        self.entered.borrow_mut().push("3");
        t.success();
        Fault::raise("IllegalState", "fixture missing");
    }

    fn test_4(&self, t: &mut Tester) {
        self.entered.borrow_mut().push("4");
        t.success();
    }

    fn test_5(&self, t: &mut Tester) {
        self.entered.borrow_mut().push("5");
        t.success();
    }
}

#[test]
fn test_escaping_fault_aborts_remaining_methods() {
    let batch = Batch::default();
    let mut orch = orchestrator();
    let report = reported(orch.run(&batch));

    assert_eq!(*batch.entered.borrow(), vec!["1", "2", "3"]);
    assert_eq!(report.methods_run, vec!["test_1", "test_2", "test_3"]);
    // Three checks ran before the fault; the escape adds exactly one failure.
    assert_eq!(report.summary.tests, 4);
    assert_eq!(report.summary.failures, 2);
    assert_eq!(report.summary.aborted_by.as_deref(), Some("test_3"));
    assert!(report.text.contains(
        "fault escaped from test method test_3 in the class Batch; remaining test methods were not run"
    ));
    assert!(report.text.contains("actual:     IllegalState: fixture missing\nexpected:   no fault\n"));
    assert_eq!(orch.state(), RunState::Reported);
}

#[derive(Default)]
struct Fallible;

#[derive(Debug, thiserror::Error)]
#[error("database unavailable")]
struct Unavailable;

#[subject]
impl Fallible {
    fn test_connects(&self, t: &mut Tester) -> Result<(), Unavailable> {
        t.success();
        Err(Unavailable)
    }

    fn test_never_runs(&self, t: &mut Tester) {
        t.fail();
    }
}

#[test]
fn test_returned_error_escapes_like_a_raised_fault() {
    let report = reported(orchestrator().run(&Fallible));
    assert_eq!(report.methods_run, vec!["test_connects"]);
    assert_eq!(report.summary.tests, 2);
    assert_eq!(report.summary.failures, 1);
    assert!(report.text.contains("actual:     Unavailable: database unavailable\n"));
}

// =============================================================================
// Discovery
// =============================================================================

#[derive(Default)]
struct Conventions;

#[subject]
impl Conventions {
    fn test_named(&self, t: &mut Tester) {
        t.success();
    }

    #[test_method]
    fn marked(&self, t: &mut Tester) {
        t.success();
    }

    fn helper(&self, t: &mut Tester) {
        t.fail();
    }

    fn test_value(&self) -> i32 {
        1
    }
}

#[test]
fn test_prefix_and_marker_discovery_coexist() {
    let report = reported(orchestrator().run(&Conventions));
    assert_eq!(report.methods_run, vec!["test_named", "marked"]);
    assert!(report.summary.passed);
}

#[test]
fn test_custom_prefix() {
    let mut orch = Orchestrator::new(
        HarnessConfig::default()
            .with_test_prefix("help")
            .with_trace(TraceConfig::disabled()),
    )
    .unwrap();
    let report = reported(orch.run(&Conventions));
    assert_eq!(report.methods_run, vec!["marked", "helper"]);
    assert!(!report.summary.passed);
}

#[derive(Default)]
struct Aggregate;

#[subject(examples)]
impl Aggregate {
    fn test_ignored(&self, t: &mut Tester) {
        t.fail();
    }
}

impl Examples for Aggregate {
    fn tests(&self, t: &mut Tester) {
        t.check_expect(1 + 1, 2);
        t.check_one_of('b', ['a', 'b']);
    }
}

#[test]
fn test_aggregate_entry_point_replaces_convention_discovery() {
    let report = reported(orchestrator().run(&Aggregate));
    assert_eq!(report.methods_run, vec!["tests"]);
    assert_eq!(report.summary.tests, 2);
    assert!(report.summary.passed);
}

#[derive(Default)]
struct Parent;

#[subject]
impl Parent {
    fn test_inherited(&self, t: &mut Tester) {
        t.success();
    }
}

#[derive(Default)]
struct Child {
    parent: Parent,
}

#[subject(extends = Parent, via = parent)]
impl Child {
    fn test_own(&self, t: &mut Tester) {
        t.success();
    }
}

#[test]
fn test_inherited_test_methods_run_after_own() {
    let report = reported(orchestrator().run(&Child::default()));
    assert_eq!(report.methods_run, vec!["test_own", "test_inherited"]);
}

// =============================================================================
// Lifecycle and reporting hooks
// =============================================================================

#[derive(Default)]
struct Nothing;

#[subject]
impl Nothing {}

#[test]
fn test_no_tests_means_no_run() {
    let mut orch = orchestrator();
    let outcome = orch.run(&Nothing);
    assert!(matches!(outcome, RunOutcome::NoTests { ref class, inspection: None } if class == "Nothing"));
    assert_eq!(orch.state(), RunState::Idle);
}

/// Records lifecycle events where the test can read them after the run.
#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl TestReporter for Recorder {
    fn on_methods_discovered(&mut self, class: &str, methods: &[&str]) {
        self.0.borrow_mut().push(format!("discovered {class}: {}", methods.join(", ")));
    }

    fn on_method_start(&mut self, _class: &str, method: &str) {
        self.0.borrow_mut().push(format!("start {method}"));
    }

    fn on_escaping_fault(&mut self, _class: &str, method: &str, fault: &Fault) {
        self.0.borrow_mut().push(format!("escape {method}: {fault}"));
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        self.0.borrow_mut().push(format!("complete {}/{}", summary.failures, summary.tests));
    }
}

#[test]
fn test_reporter_sees_lifecycle_events() {
    let recorder = Recorder::default();
    let mut orch = orchestrator().with_reporter(Box::new(recorder.clone()));
    orch.run(&Batch::default());

    assert_eq!(
        *recorder.0.borrow(),
        vec![
            "discovered Batch: test_1, test_2, test_3, test_4, test_5",
            "start test_1",
            "start test_2",
            "start test_3",
            "escape test_3: IllegalState: fixture missing",
            "complete 2/4",
        ]
    );
}

#[test]
fn test_each_run_starts_from_a_fresh_ledger() {
    let mut orch = orchestrator();
    let first = reported(orch.run(&Conventions));
    let second = reported(orch.run(&Conventions));
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.text, second.text);
}

#[test]
fn test_full_report_and_print_all() {
    let mut orch = Orchestrator::new(
        HarnessConfig::default()
            .with_full_report(true)
            .with_print_all(true)
            .with_trace(TraceConfig::disabled()),
    )
    .unwrap();
    let report = reported(orch.run(&Conventions));
    assert_eq!(
        report.inspection.as_deref(),
        Some("Conventions:\n---------------\n<Conventions>\n---------------\n")
    );
    assert!(report.text.contains("Success in the test number 2\n"));
    assert!(report.text.ends_with("--- END OF FULL TEST RESULTS ---"));
}

#[test]
fn test_run_hooks_return_the_verdict() {
    assert!(nutest::run(&Conventions));
    assert!(nutest::run_full_report(&Aggregate));
    assert!(!nutest::run_report(&Fallible, false, false));
}
