//! Fixed report text: section headers, footers, and the count/failure tally lines.
//!
//! The harness appends narratives between a header and a footer; the tally sits in front of the narrative.

/// Header printed before a summary (failures only) report.
pub const SUMMARY_HEADER: &str = "Test results:\n--------------\n";

/// Header printed before a full (every test) report.
pub const FULL_HEADER: &str = "Full test results:\n-------------------\n";

/// Footer closing a summary report.
pub const SUMMARY_FOOTER: &str = "\n--- END OF TEST RESULTS ---";

/// Footer closing a full report.
pub const FULL_FOOTER: &str = "\n--- END OF FULL TEST RESULTS ---";

/// Count line for `tests` executed checks. Omitted entirely when no check ran.
///
/// ## Examples
/// ```rust
/// use nutest_core::report::count_line;
///
/// assert_eq!(count_line(0), None);
/// assert_eq!(count_line(1).as_deref(), Some("\nRan 1 test.\n"));
/// assert_eq!(count_line(3).as_deref(), Some("\nRan 3 tests.\n"));
/// ```
pub fn count_line(tests: usize) -> Option<String> {
    match tests {
        0 => None,
        1 => Some("\nRan 1 test.\n".to_string()),
        n => Some(format!("\nRan {n} tests.\n")),
    }
}

/// Failure line for `failures` failed checks.
pub fn failure_line(failures: usize) -> String {
    match failures {
        0 => "All tests passed.\n\n".to_string(),
        1 => "1 test failed.\n\n".to_string(),
        n => format!("{n} tests failed.\n\n"),
    }
}

/// Count line (if any) followed by the failure line.
pub fn tally(tests: usize, failures: usize) -> String {
    let mut out = count_line(tests).unwrap_or_default();
    out.push_str(&failure_line(failures));
    out
}
