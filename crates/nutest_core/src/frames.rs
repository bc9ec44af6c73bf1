//! Stack-frame prefix tables used when trimming diagnostics traces.
//!
//! Frames whose symbol starts with one of these prefixes (or contains one of the fragments) belong to the harness,
//! the panic/reflection machinery, the runtime, or an interactive shell, and are dropped from the trace shown
//! to users.

/// Symbols that belong to the harness itself.
pub const HARNESS_PREFIXES: &[&str] = &["nutest::", "nutest_core::", "nutest_derive::", "<nutest::"];

/// Fragments marking harness trait impls on user types (`<Account as nutest::reflect::Reflect>`).
pub const HARNESS_FRAGMENTS: &[&str] = &[" as nutest::"];

/// Closure-call and unwinding machinery that sits between the harness and user code.
pub const REFLECTION_PREFIXES: &[&str] = &[
    "core::ops::function::",
    "std::panic::",
    "std::panicking::",
    "core::panic::",
];

/// Standard library and process start-up frames.
pub const RUNTIME_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "test::",
    "__rust",
    "__libc",
    "_start",
    "<alloc::",
    "<core::",
    "<std::",
];

/// Interactive shells that may host a run.
pub const SHELL_PREFIXES: &[&str] = &["evcxr::", "evcxr_repl::", "irust::"];

/// Every prefix excluded by default, in table order.
pub fn default_excluded_prefixes() -> Vec<&'static str> {
    HARNESS_PREFIXES
        .iter()
        .chain(REFLECTION_PREFIXES)
        .chain(RUNTIME_PREFIXES)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_exclude_shell_prefixes() {
        let defaults = default_excluded_prefixes();
        assert!(defaults.contains(&"nutest::"));
        assert!(defaults.contains(&"std::panicking::"));
        assert!(SHELL_PREFIXES.iter().all(|p| !defaults.contains(p)));
    }
}
