//! CLI module for the nutest harness
//!
//! Runs the bundled example subjects and prints their reports.
//!
//! ## Usage
//!
//! - `nutest` - run every opted-in class, or `Examples` when none opted in
//! - `nutest Account --full` - run one class and print every check
//! - `nutest --list` - list the registered classes
//! - `nutest --json` - print one JSON run summary per class instead of report text
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! `execute` returns `CliResult<ExitCode>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::process;

use clap::Parser;

use crate::catalog::ExampleCatalog;
use crate::config::{HarnessConfig, TraceConfig};
use crate::demos;
use crate::fault::quiet_fault_panics;
use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::version::NUTEST_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Carries a user-facing message and an exit code. The CLI entry point prints the message and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a diagnostic with its code and help text.
    fn diagnostic(err: impl miette::Diagnostic + Send + Sync + 'static) -> Self {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run the bundled nutest example subjects
#[derive(Parser, Debug)]
#[command(name = "nutest")]
#[command(version = NUTEST_VERSION)]
#[command(about = "Run the bundled nutest example subjects", long_about = None)]
pub struct Cli {
    /// Class to run (default: every opted-in class, else `Examples`)
    #[arg(value_name = "CLASS")]
    pub class: Option<String>,

    /// Print every check, not only the failures
    #[arg(long)]
    pub full: bool,

    /// Print each subject's fields before its report
    #[arg(long = "print-all")]
    pub print_all: bool,

    /// Relative tolerance for inexact numbers
    #[arg(long, value_name = "EPS", allow_hyphen_values = true)]
    pub tolerance: Option<f64>,

    /// Print JSON run summaries instead of report text
    #[arg(long)]
    pub json: bool,

    /// List the registered classes and exit
    #[arg(long, conflicts_with_all = ["class", "json"])]
    pub list: bool,

    /// Leave stack traces out of failure narratives
    #[arg(long = "no-trace")]
    pub no_trace: bool,
}

impl Cli {
    /// Harness configuration selected by the flags, validated.
    pub fn config(&self) -> CliResult<HarnessConfig> {
        let mut config = HarnessConfig::default()
            .with_full_report(self.full)
            .with_print_all(self.print_all);
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if self.no_trace {
            config = config.with_trace(TraceConfig::disabled());
        }
        config.validate().map_err(CliError::diagnostic)?;
        Ok(config)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    quiet_fault_panics();
    let cli = Cli::parse();

    match execute(cli, &demos::catalog()) {
        Ok(exit_code) => {
            if exit_code != ExitCode::SUCCESS {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the parsed command line against `catalog`.
///
/// ## Returns
/// - `ExitCode::FAILURE` when any run recorded a failure, `ExitCode::SUCCESS` otherwise.
pub fn execute(cli: Cli, catalog: &ExampleCatalog) -> CliResult<ExitCode> {
    if cli.list {
        for (name, opted_in) in catalog.names() {
            let marker = if opted_in { " (opted in)" } else { "" };
            println!("{name}{marker}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.config()?;
    let tolerance = config.tolerance;
    let mut orchestrator = Orchestrator::configured(config);
    let outcomes = catalog
        .drive(&mut orchestrator, cli.class.as_deref())
        .map_err(CliError::diagnostic)?;

    if cli.json {
        let summaries: Vec<_> = outcomes.iter().map(|o| o.summary(tolerance)).collect();
        let json = serde_json::to_string_pretty(&summaries)
            .map_err(|e| CliError::failure(format!("Error serializing run summaries: {e}")))?;
        println!("{json}");
    } else {
        for outcome in &outcomes {
            print_outcome(outcome);
        }
    }

    if outcomes.iter().all(RunOutcome::passed) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoTests { class, .. } => {
            print!("{}", outcome.render());
            println!("No test methods found in the class {class}");
        }
        RunOutcome::Reported(_) => println!("{}", outcome.render()),
    }
}

// ============================================================================
// Tests
// ============================================================================
