#![no_main]

use libfuzzer_sys::fuzz_target;
use nutest::config::TraceConfig;
use nutest::diagnostics::{DiagnosticsFormatter, parse_backtrace};

fuzz_target!(|data: &[u8]| {
    // Backtrace text comes from the host; any UTF-8 must parse and format without panicking
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_backtrace(s);
        let formatter = DiagnosticsFormatter::new(&TraceConfig::default());
        let _ = formatter.format(None, s);
    }
});
