//! Report rendering and run lifecycle events.
//!
//! [`Reporter`] turns a finished [`RunLedger`] into report text. The wording of the count and failure lines comes
//! from `nutest_core::report` so the binary, the library and the generated reference agree.
//!
//! ## TestReporter Trait
//!
//! The orchestrator announces each stage of a run through [`TestReporter`]. This keeps report text (which is a
//! literal contract) apart from progress output, which goes to `tracing` in [`ConsoleReporter`].

use serde::Serialize;

use nutest_core::report as wording;

use crate::fault::Fault;
use crate::ledger::RunLedger;

// ============================================================================
// Report text
// ============================================================================

pub struct Reporter;

impl Reporter {
    /// Count line, verdict line and the failure-only narrative.
    ///
    /// ## Examples
    /// ```rust
    /// use nutest::ledger::RunLedger;
    /// use nutest::report::Reporter;
    ///
    /// let mut ledger = RunLedger::new(0.001);
    /// ledger.record_success("Success in the test number 1\n");
    /// assert!(Reporter::summary(&ledger).starts_with("\nRan 1 test.\nAll tests passed.\n\nTest results:"));
    /// ```
    pub fn summary(ledger: &RunLedger) -> String {
        Self::render(ledger, false)
    }

    /// Count line, verdict line and the narrative of every check.
    pub fn full(ledger: &RunLedger) -> String {
        Self::render(ledger, true)
    }

    pub fn render(ledger: &RunLedger, full: bool) -> String {
        let mut out = wording::tally(ledger.test_count(), ledger.error_count());
        if full {
            out.push_str(ledger.full());
            out.push_str(wording::FULL_FOOTER);
        } else {
            out.push_str(ledger.summary());
            out.push_str(wording::SUMMARY_FOOTER);
        }
        out
    }
}

/// Machine-readable outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub class: String,
    pub tests: usize,
    pub failures: usize,
    pub passed: bool,
    /// Test method whose escaping fault aborted the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_by: Option<String>,
    pub tolerance: f64,
}

impl RunSummary {
    pub fn from_ledger(class: &str, ledger: &RunLedger, aborted_by: Option<String>) -> Self {
        Self {
            class: class.to_string(),
            tests: ledger.test_count(),
            failures: ledger.error_count(),
            passed: ledger.passed(),
            aborted_by,
            tolerance: ledger.tolerance(),
        }
    }

    /// Summary of a subject with nothing to run.
    pub fn no_tests(class: &str, tolerance: f64) -> Self {
        Self {
            class: class.to_string(),
            tests: 0,
            failures: 0,
            passed: true,
            aborted_by: None,
            tolerance,
        }
    }
}

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Receives run lifecycle events.
///
/// Implement this trait to observe runs (progress bars, structured logs); it never changes report text.
pub trait TestReporter {
    fn on_run_start(&mut self, _class: &str) {}

    /// Called once per run with the discovered test methods, in execution order.
    fn on_methods_discovered(&mut self, class: &str, methods: &[&str]);

    fn on_method_start(&mut self, _class: &str, _method: &str) {}

    /// Called when a fault escapes a test method and aborts the run.
    fn on_escaping_fault(&mut self, class: &str, method: &str, fault: &Fault);

    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Default reporter: lifecycle events become `tracing` events.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl TestReporter for ConsoleReporter {
    fn on_run_start(&mut self, class: &str) {
        tracing::debug!(class, "run started");
    }

    fn on_methods_discovered(&mut self, class: &str, methods: &[&str]) {
        if methods.is_empty() {
            tracing::info!(class, "no test methods found");
        } else {
            tracing::debug!(class, count = methods.len(), methods = ?methods, "test methods discovered");
        }
    }

    fn on_method_start(&mut self, class: &str, method: &str) {
        tracing::trace!(class, method, "running test method");
    }

    fn on_escaping_fault(&mut self, class: &str, method: &str, fault: &Fault) {
        tracing::warn!(class, method, fault = %fault, "fault escaped a test method; aborting the run");
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        tracing::info!(
            class = %summary.class,
            tests = summary.tests,
            failures = summary.failures,
            "run complete"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ledger() -> RunLedger {
        let mut ledger = RunLedger::new(0.001);
        ledger.record_success("Success in the test number 1\n");
        ledger.record_failure("Error in test number 2\n");
        ledger
    }

    #[test]
    fn test_summary_omits_successes() {
        let text = Reporter::summary(&ledger());
        assert!(text.starts_with("\nRan 2 tests.\n1 test failed.\n\nTest results:\n"));
        assert!(text.contains("Error in test number 2"));
        assert!(!text.contains("Success in the test number 1"));
        assert!(text.ends_with("\n--- END OF TEST RESULTS ---"));
    }

    #[test]
    fn test_full_keeps_every_narrative() {
        let text = Reporter::full(&ledger());
        assert!(text.contains("Full test results:\n"));
        assert!(text.contains("Success in the test number 1"));
        assert!(text.contains("Error in test number 2"));
        assert!(text.ends_with("\n--- END OF FULL TEST RESULTS ---"));
    }

    #[test]
    fn test_empty_run_has_no_count_line() {
        let text = Reporter::summary(&RunLedger::new(0.001));
        assert!(text.starts_with("All tests passed.\n\nTest results:"));
    }

    #[test]
    fn test_run_summary_serializes_without_abort() {
        let summary = RunSummary::from_ledger("Account", &ledger(), None);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["class"], "Account");
        assert_eq!(json["tests"], 2);
        assert_eq!(json["failures"], 1);
        assert_eq!(json["passed"], false);
        assert!(json.get("aborted_by").is_none());
    }
}
