//! Failure traces showing only the caller's own frames.
//!
//! A failing check captures the current backtrace, parses it into [`Frame`]s and drops every frame that belongs to
//! the harness, the closure-call/unwinding machinery, the standard library or an interactive shell. What is left is
//! the path through the user's test code, headed by the exact source location of the failing check.
//!
//! ## Notes
//! - Symbols are only as good as the host's debug info. The check site comes from `#[track_caller]` and is always
//!   present, so a trace is never empty even in stripped builds.

use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::panic::Location;

use nutest_core::frames::HARNESS_FRAGMENTS;

use crate::config::TraceConfig;
use crate::fault::Fault;

/// One parsed backtrace frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub symbol: String,
    pub location: Option<String>,
}

/// Parse the `Display` output of [`std::backtrace::Backtrace`].
///
/// Frame lines look like `  12: crate::module::function::h0123456789abcdef`, optionally followed by an
/// `at path/to/file.rs:10:5` line. Anything else is ignored.
pub fn parse_backtrace(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.location.is_none() {
                    frame.location = Some(location.to_string());
                }
            }
            continue;
        }
        let Some((index, symbol)) = line.split_once(": ") else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        frames.push(Frame {
            symbol: strip_hash(symbol.trim()).to_string(),
            location: None,
        });
    }
    frames
}

/// `foo::bar::h0123456789abcdef` -> `foo::bar`.
fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) => head,
        _ => symbol,
    }
}

/// Decides which frames are the user's.
#[derive(Debug, Clone)]
pub struct FrameFilter {
    prefixes: Vec<String>,
    fragments: Vec<String>,
}

impl FrameFilter {
    pub fn from_config(trace: &TraceConfig) -> Self {
        Self {
            prefixes: trace
                .excluded_prefixes
                .iter()
                .chain(&trace.shell_prefixes)
                .cloned()
                .collect(),
            fragments: HARNESS_FRAGMENTS.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn is_user_frame(&self, frame: &Frame) -> bool {
        let symbol = frame.symbol.as_str();
        !self.prefixes.iter().any(|p| symbol.starts_with(p.as_str()))
            && !self.fragments.iter().any(|f| symbol.contains(f.as_str()))
    }

    pub fn filter(&self, frames: Vec<Frame>) -> Vec<Frame> {
        frames.into_iter().filter(|f| self.is_user_frame(f)).collect()
    }
}

/// Produces the trace text appended to failure narratives.
#[derive(Debug, Clone)]
pub struct DiagnosticsFormatter {
    enabled: bool,
    filter: FrameFilter,
}

impl DiagnosticsFormatter {
    pub fn new(trace: &TraceConfig) -> Self {
        Self {
            enabled: trace.enabled,
            filter: FrameFilter::from_config(trace),
        }
    }

    pub fn disabled() -> Self {
        Self::new(&TraceConfig::disabled())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Capture the current stack for a check that failed at `site`. Empty when traces are disabled.
    pub fn capture(&self, site: &Location<'_>) -> String {
        if !self.enabled {
            return String::new();
        }
        let backtrace = Backtrace::force_capture();
        self.format(Some(site), &backtrace.to_string())
    }

    /// Trace for a fault that escaped a test method, from the backtrace recorded when it was raised.
    pub fn capture_fault(&self, fault: &Fault) -> String {
        if !self.enabled {
            return String::new();
        }
        match fault.backtrace() {
            Some(text) => self.format(None, text),
            None => String::new(),
        }
    }

    /// Render backtrace text, keeping user frames only.
    pub fn format(&self, site: Option<&Location<'_>>, backtrace: &str) -> String {
        let frames = self.filter.filter(parse_backtrace(backtrace));
        if site.is_none() && frames.is_empty() {
            return String::new();
        }
        let mut out = String::from("Error trace:\n");
        if let Some(site) = site {
            let _ = writeln!(out, "\tchecked at {}:{}:{}", site.file(), site.line(), site.column());
        }
        for frame in frames {
            match frame.location {
                Some(location) => {
                    let _ = writeln!(out, "\tat {} ({})", frame.symbol, location);
                }
                None => {
                    let _ = writeln!(out, "\tat {}", frame.symbol);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/library/std/src/backtrace.rs:310:9
   1: nutest::diagnostics::DiagnosticsFormatter::capture::h0123456789abcdef
             at ./src/diagnostics.rs:120:25
   2: bank::tests::test_deposit
             at ./tests/bank.rs:14:9
   3: <bank::Account as nutest::reflect::Reflect>::class_info::{{closure}}
   4: core::ops::function::Fn::call
   5: evcxr::eval::run
   6: bank::main
             at ./tests/bank.rs:30:5
   7: __rust_begin_short_backtrace
";

    #[test]
    fn test_parse_backtrace_pairs_locations() {
        let frames = parse_backtrace(SAMPLE);
        assert_eq!(frames.len(), 8);
        assert_eq!(frames[1].symbol, "nutest::diagnostics::DiagnosticsFormatter::capture");
        assert_eq!(frames[2].location.as_deref(), Some("./tests/bank.rs:14:9"));
        assert_eq!(frames[3].location, None);
    }

    #[test]
    fn test_filter_keeps_only_user_frames() {
        let formatter = DiagnosticsFormatter::new(&TraceConfig::default());
        let text = formatter.format(None, SAMPLE);
        assert_eq!(
            text,
            "Error trace:\n\tat bank::tests::test_deposit (./tests/bank.rs:14:9)\n\tat bank::main (./tests/bank.rs:30:5)\n"
        );
    }

    #[test]
    fn test_disabled_formatter_captures_nothing() {
        let formatter = DiagnosticsFormatter::disabled();
        assert_eq!(formatter.capture(Location::caller()), "");
    }

    #[test]
    fn test_capture_starts_at_the_check_site() {
        let formatter = DiagnosticsFormatter::new(&TraceConfig::default());
        let site = Location::caller();
        let text = formatter.capture(site);
        assert!(text.starts_with(&format!("Error trace:\n\tchecked at {}:{}:", site.file(), site.line())));
    }

    #[test]
    fn test_strip_hash_leaves_plain_symbols() {
        assert_eq!(strip_hash("a::b::h0123456789abcdef"), "a::b");
        assert_eq!(strip_hash("a::helper"), "a::helper");
    }
}
