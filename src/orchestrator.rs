//! Test discovery and sequential execution of one subject.
//!
//! ## Lifecycle
//!
//! `Idle → Running → Completed(Passed|Failed) → Reported`. Every [`Orchestrator::run`] starts from `Idle` with a
//! fresh ledger; a subject without test methods never leaves `Idle`.
//!
//! ## Discovery
//!
//! A subject registering an aggregate [`Examples`](crate::reflect::Examples) entry point is run through that
//! entry point alone. Otherwise every method that is explicitly marked, or whose name starts with the configured
//! prefix and which takes the tester as its single parameter, runs in table order (own declarations first, then
//! inherited ones).
//!
//! ## Notes
//! - Faults raised inside checks are recorded by the check and the run continues.
//! - A fault escaping a test method body is recorded once and aborts the remaining methods.

use std::any::Any;

use crate::config::{ConfigError, HarnessConfig};
use crate::engine::Tester;
use crate::fault::Fault;
use crate::printer::{DefaultPrinter, Printer};
use crate::reflect::invoker::{Invoker, run_guarded};
use crate::reflect::{ClassInfo, MethodEntry, Reflect, TestFn};
use crate::report::{ConsoleReporter, Reporter, RunSummary, TestReporter};

/// Name under which an aggregate entry point appears in reports.
pub const AGGREGATE_METHOD: &str = "tests";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed(Verdict),
    Reported,
}

/// What a subject offers to run.
pub enum Discovery<'a> {
    Aggregate(&'a TestFn),
    Methods(Vec<&'a MethodEntry>),
    Empty,
}

impl Discovery<'_> {
    pub fn method_names(&self) -> Vec<&str> {
        match self {
            Discovery::Aggregate(_) => vec![AGGREGATE_METHOD],
            Discovery::Methods(methods) => methods.iter().map(|m| m.name).collect(),
            Discovery::Empty => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub summary: RunSummary,
    /// Rendered subject, present when printing of the subject was requested.
    pub inspection: Option<String>,
    /// Summary or full report text.
    pub text: String,
    /// Test methods that were entered, in order.
    pub methods_run: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing to run. The subject may still have been rendered.
    NoTests { class: String, inspection: Option<String> },
    Reported(RunReport),
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        match self {
            RunOutcome::NoTests { .. } => true,
            RunOutcome::Reported(report) => report.summary.passed,
        }
    }

    pub fn summary(&self, tolerance: f64) -> RunSummary {
        match self {
            RunOutcome::NoTests { class, .. } => RunSummary::no_tests(class, tolerance),
            RunOutcome::Reported(report) => report.summary.clone(),
        }
    }

    /// Everything a console run prints: the rendered subject (if any), then the report.
    pub fn render(&self) -> String {
        match self {
            RunOutcome::NoTests { inspection, .. } => inspection.clone().unwrap_or_default(),
            RunOutcome::Reported(report) => {
                let mut out = report.inspection.clone().unwrap_or_default();
                out.push_str(&report.text);
                out
            }
        }
    }
}

pub struct Orchestrator {
    config: HarnessConfig,
    reporter: Box<dyn TestReporter>,
    state: RunState,
}

impl Orchestrator {
    pub fn new(config: HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::configured(config))
    }

    pub(crate) fn configured(config: HarnessConfig) -> Self {
        Self {
            config,
            reporter: Box::new(ConsoleReporter),
            state: RunState::Idle,
        }
    }

    pub fn with_reporter(mut self, reporter: Box<dyn TestReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Find what `class` offers to run under the configured prefix.
    pub fn discover<'a>(&self, class: &'a ClassInfo) -> Discovery<'a> {
        if let Some(aggregate) = &class.aggregate {
            return Discovery::Aggregate(aggregate);
        }
        let prefix = self.config.test_prefix.as_str();
        let methods: Vec<&MethodEntry> = class
            .methods
            .iter()
            .filter(|m| m.marked || (m.name.starts_with(prefix) && m.is_test_shaped()))
            .collect();
        if methods.is_empty() {
            Discovery::Empty
        } else {
            Discovery::Methods(methods)
        }
    }

    /// Discover and run every test of `subject`, then render the report.
    #[tracing::instrument(skip_all, fields(class = S::class_info().name))]
    pub fn run<S: Reflect>(&mut self, subject: &S) -> RunOutcome {
        self.state = RunState::Idle;
        let class = S::class_info();
        let discovery = self.discover(class);
        // The aggregate entry point always shows its subject.
        let shown = self.config.print_all || matches!(discovery, Discovery::Aggregate(_));
        let inspection = shown.then(|| inspect(subject));
        let names = discovery.method_names();
        self.reporter.on_methods_discovered(class.name, &names);
        if matches!(discovery, Discovery::Empty) {
            return RunOutcome::NoTests {
                class: class.name.to_string(),
                inspection,
            };
        }

        self.state = RunState::Running;
        self.reporter.on_run_start(class.name);
        let mut tester = Tester::configured(&self.config);
        let mut methods_run = Vec::new();
        let mut aborted_by = None;

        match discovery {
            Discovery::Aggregate(entry) => {
                methods_run.push(AGGREGATE_METHOD.to_string());
                self.reporter.on_method_start(class.name, AGGREGATE_METHOD);
                let subject: &dyn Any = subject;
                if let Err(fault) = run_guarded(|| entry(subject, &mut tester)) {
                    self.escape(&mut tester, class.name, AGGREGATE_METHOD, &fault);
                    aborted_by = Some(AGGREGATE_METHOD.to_string());
                }
            }
            Discovery::Methods(methods) => {
                for entry in methods {
                    methods_run.push(entry.name.to_string());
                    self.reporter.on_method_start(class.name, entry.name);
                    if let Err(fault) = Invoker::invoke_test(entry, subject, &mut tester) {
                        self.escape(&mut tester, class.name, entry.name, &fault);
                        aborted_by = Some(entry.name.to_string());
                        break;
                    }
                }
            }
            Discovery::Empty => {}
        }

        let ledger = tester.into_ledger();
        let verdict = if ledger.passed() { Verdict::Passed } else { Verdict::Failed };
        self.state = RunState::Completed(verdict);

        let text = Reporter::render(&ledger, self.config.full_report);
        let summary = RunSummary::from_ledger(class.name, &ledger, aborted_by);
        self.reporter.on_run_complete(&summary);
        self.state = RunState::Reported;

        RunOutcome::Reported(RunReport {
            summary,
            inspection,
            text,
            methods_run,
        })
    }

    fn escape(&mut self, tester: &mut Tester, class: &str, method: &str, fault: &Fault) {
        self.reporter.on_escaping_fault(class, method, fault);
        tester.record_escape(class, method, fault);
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Render the subject's fields between rules, headed by its class name.
fn inspect<S: Reflect>(subject: &S) -> String {
    format!(
        "{}:\n---------------\n{}\n---------------\n",
        S::class_info().name,
        DefaultPrinter.render(&subject.inspect())
    )
}

// ============================================================================
// Convenience hooks
// ============================================================================

/// Run `subject`, print the subject and the summary report to stdout, and return whether every check passed.
pub fn run<S: Reflect>(subject: &S) -> bool {
    run_report(subject, false, true)
}

/// Like [`run`], printing the full report.
pub fn run_full_report<S: Reflect>(subject: &S) -> bool {
    run_report(subject, true, true)
}

/// Run `subject` with the default configuration and print the chosen report to stdout.
pub fn run_report<S: Reflect>(subject: &S, full: bool, print_all: bool) -> bool {
    let config = HarnessConfig::default()
        .with_full_report(full)
        .with_print_all(print_all);
    let outcome = Orchestrator::configured(config).run(subject);
    print!("{}", outcome.render());
    if matches!(outcome, RunOutcome::Reported(_)) {
        println!();
    }
    outcome.passed()
}
