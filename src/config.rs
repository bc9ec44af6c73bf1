//! Run configuration.
//!
//! ## Examples
//! ```rust
//! use nutest::config::HarnessConfig;
//!
//! let config = HarnessConfig::default().with_tolerance(0.01).with_full_report(true);
//! assert!(config.validate().is_ok());
//! assert!(HarnessConfig::default().with_tolerance(0.0).validate().is_err());
//! ```

use miette::Diagnostic;
use thiserror::Error;

use nutest_core::frames;

use crate::equality::DEFAULT_TOLERANCE;

/// Prefix a method name needs to be discovered as a test by convention.
pub const DEFAULT_TEST_PREFIX: &str = "test";

#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum ConfigError {
    #[error("tolerance must be positive, got {0}")]
    #[diagnostic(
        code(nutest::config::tolerance),
        help("pass a small positive relative tolerance such as 0.001")
    )]
    NonPositiveTolerance(f64),

    #[error("test method prefix must not be empty")]
    #[diagnostic(code(nutest::config::test_prefix))]
    EmptyTestPrefix,
}

/// Which stack frames appear in failure traces.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceConfig {
    /// Capture a trace on failing checks at all.
    pub enabled: bool,
    /// Symbol prefixes of harness, reflection and runtime frames.
    pub excluded_prefixes: Vec<String>,
    /// Symbol prefixes of interactive shell frames.
    pub shell_prefixes: Vec<String>,
}

impl TraceConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            excluded_prefixes: frames::default_excluded_prefixes()
                .into_iter()
                .map(String::from)
                .collect(),
            shell_prefixes: frames::SHELL_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Relative tolerance for inexact numbers, owned by the run's equality service.
    pub tolerance: f64,
    /// Render every check instead of failures only.
    pub full_report: bool,
    /// Render the subject's fields before the report.
    pub print_all: bool,
    pub test_prefix: String,
    pub trace: TraceConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            full_report: false,
            print_all: false,
            test_prefix: DEFAULT_TEST_PREFIX.to_string(),
            trace: TraceConfig::default(),
        }
    }
}

impl HarnessConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_full_report(mut self, full_report: bool) -> Self {
        self.full_report = full_report;
        self
    }

    pub fn with_print_all(mut self, print_all: bool) -> Self {
        self.print_all = print_all;
        self
    }

    pub fn with_test_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.test_prefix = prefix.into();
        self
    }

    pub fn with_trace(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // `!(x > 0)` also rejects NaN.
        if !(self.tolerance > 0.0) {
            return Err(ConfigError::NonPositiveTolerance(self.tolerance));
        }
        if self.test_prefix.is_empty() {
            return Err(ConfigError::EmptyTestPrefix);
        }
        Ok(())
    }
}
