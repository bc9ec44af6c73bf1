//! Per-run mutable state: counts, tolerance and the accumulated narratives.

use nutest_core::report::{FULL_HEADER, SUMMARY_HEADER};

/// Record of one run.
///
/// ## Notes
/// - `test_count >= error_count` always holds; each record call adds exactly one test.
/// - The summary narrative accumulates failures only; the full narrative accumulates every check.
/// - A ledger belongs to one run and is never reused.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLedger {
    test_count: usize,
    error_count: usize,
    tolerance: f64,
    summary: String,
    full: String,
}

impl RunLedger {
    pub fn new(tolerance: f64) -> Self {
        Self {
            test_count: 0,
            error_count: 0,
            tolerance,
            summary: SUMMARY_HEADER.to_string(),
            full: FULL_HEADER.to_string(),
        }
    }

    /// Record a passing check. Returns `true` for fluent use.
    pub fn record_success(&mut self, narrative: &str) -> bool {
        self.test_count += 1;
        append(&mut self.full, narrative);
        true
    }

    /// Record a failing check. Returns `false` for fluent use.
    pub fn record_failure(&mut self, narrative: &str) -> bool {
        self.test_count += 1;
        self.error_count += 1;
        append(&mut self.summary, narrative);
        append(&mut self.full, narrative);
        false
    }

    /// Number the next recorded check will carry.
    pub fn next_test_number(&self) -> usize {
        self.test_count + 1
    }

    pub fn test_count(&self) -> usize {
        self.test_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn passed(&self) -> bool {
        self.error_count == 0
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub(crate) fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn full(&self) -> &str {
        &self.full
    }
}

fn append(narrative: &mut String, entry: &str) {
    narrative.push('\n');
    narrative.push_str(entry);
}
