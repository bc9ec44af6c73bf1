//! Registry of runnable example classes.
//!
//! Stands in for scanning a program for classes that opt into testing: each class is registered with a name, a
//! default constructor and an opted-in flag. [`ExampleCatalog::drive`] runs the opted-in classes, falling back to
//! one named class when none opted in.

use miette::Diagnostic;
use thiserror::Error;

use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::reflect::Reflect;

/// Class run when nothing opted in and no class was named.
pub const DEFAULT_CLASS: &str = "Examples";

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("`{name}` class doesn't exist")]
    #[diagnostic(code(nutest::catalog::not_found), help("use --list to see the registered classes"))]
    NotFound { name: String },
}

type RunFn = Box<dyn Fn(&mut Orchestrator) -> RunOutcome>;

struct CatalogEntry {
    name: &'static str,
    opted_in: bool,
    run: RunFn,
}

#[derive(Default)]
pub struct ExampleCatalog {
    entries: Vec<CatalogEntry>,
}

impl ExampleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `S`, constructed with `S::default()` each time it runs.
    pub fn register<S: Reflect + Default>(mut self, name: &'static str, opted_in: bool) -> Self {
        self.entries.push(CatalogEntry {
            name,
            opted_in,
            run: Box::new(|orchestrator: &mut Orchestrator| orchestrator.run(&S::default())),
        });
        self
    }

    /// Registered names with their opted-in flag, in registration order.
    pub fn names(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.entries.iter().map(|e| (e.name, e.opted_in))
    }

    /// Run the chosen classes, each with a fresh ledger.
    ///
    /// ## Notes
    /// - A named class runs alone, opted in or not.
    /// - Without a name, every opted-in class runs in registration order.
    /// - When nothing opted in, [`DEFAULT_CLASS`] runs.
    pub fn drive(&self, orchestrator: &mut Orchestrator, name: Option<&str>) -> Result<Vec<RunOutcome>, CatalogError> {
        let chosen: Vec<&CatalogEntry> = match name {
            Some(name) => vec![self.find(name)?],
            None => {
                let opted: Vec<&CatalogEntry> = self.entries.iter().filter(|e| e.opted_in).collect();
                if opted.is_empty() {
                    tracing::debug!(class = DEFAULT_CLASS, "no class opted in; running the default class");
                    vec![self.find(DEFAULT_CLASS)?]
                } else {
                    opted
                }
            }
        };
        Ok(chosen.into_iter().map(|entry| (entry.run)(orchestrator)).collect())
    }

    fn find(&self, name: &str) -> Result<&CatalogEntry, CatalogError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CatalogError::NotFound { name: name.to_string() })
    }
}

impl std::fmt::Debug for ExampleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
