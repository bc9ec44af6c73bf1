//! Captured faults: errors returned by, or panics raised from, code the harness invokes.
//!
//! A [`Fault`] is the harness's uniform view of "something went wrong inside the subject": a kind name, an optional
//! message, an optional cause and (when the host captured one) a backtrace. Subject code produces faults three ways:
//!
//! - returning `Err(e)` from a registered method, where `e` is a `Fault` or any `std::error::Error`
//! - calling [`Fault::raise`], which unwinds with the fault as the panic payload
//! - panicking with a plain message (kind `panic`)
//!
//! ## Notes
//! - `Fault` does not implement `std::error::Error`, so the blanket `From<E: Error>` conversion coexists with the
//!   reflexive `From<Fault>` and `?` works on either inside subject methods.
//! - [`Fault::descriptor`] unwraps exactly one level of an invocation wrapper to recover the subject's own fault.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;
use std::panic;

/// Kind given to faults produced from plain panic payloads.
pub const PANIC_KIND: &str = "panic";

/// Kind of the wrapper the invoker puts around a subject's fault.
pub const INVOCATION_KIND: &str = "InvocationFault";

/// Kind used when arguments or receivers do not fit the invoked method.
pub const ILLEGAL_ARGUMENT_KIND: &str = "IllegalArgument";

#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    kind: String,
    message: Option<String>,
    cause: Option<Box<Fault>>,
    backtrace: Option<String>,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: Some(message.into()),
            cause: None,
            backtrace: None,
        }
    }

    /// A fault with a kind but no message.
    pub fn bare(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
            cause: None,
            backtrace: None,
        }
    }

    pub fn with_cause(mut self, cause: Fault) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Attach the current backtrace when the host has backtraces enabled (`RUST_BACKTRACE`).
    pub fn with_backtrace(mut self) -> Self {
        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            self.backtrace = Some(backtrace.to_string());
        }
        self
    }

    /// Raise a typed fault by unwinding with it as the panic payload.
    ///
    /// The invoker and orchestrator catch the unwind and recover the fault unchanged, so `kind` and `message`
    /// are exactly what an exception-expectation check compares against.
    #[track_caller]
    pub fn raise(kind: impl Into<String>, message: impl Into<String>) -> ! {
        panic::panic_any(Fault::new(kind, message).with_backtrace())
    }

    /// Adapt an error value. The kind is the error's short type name; `source()` chains become causes.
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        Self {
            kind: short_type_name::<E>().to_string(),
            message: Some(err.to_string()),
            cause: err.source().map(Fault::from_source).map(Box::new),
            backtrace: None,
        }
    }

    fn from_source(err: &(dyn Error + 'static)) -> Self {
        Self {
            kind: "Error".to_string(),
            message: Some(err.to_string()),
            cause: err.source().map(Fault::from_source).map(Box::new),
            backtrace: None,
        }
    }

    /// Adapt a payload caught by `catch_unwind`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Fault>() {
            Ok(fault) => return *fault,
            Err(other) => other,
        };
        if let Some(message) = payload.downcast_ref::<&'static str>() {
            return Fault::new(PANIC_KIND, *message);
        }
        if let Some(message) = payload.downcast_ref::<String>() {
            return Fault::new(PANIC_KIND, message.clone());
        }
        Fault::bare(PANIC_KIND)
    }

    /// Wrap a fault raised by an invoked method.
    pub fn invocation(method: &str, inner: Fault) -> Self {
        Fault::new(INVOCATION_KIND, format!("method `{method}` faulted")).with_cause(inner)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause(&self) -> Option<&Fault> {
        self.cause.as_deref()
    }

    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }

    /// Kind and message used for comparison, unwrapping one invocation wrapper if present.
    pub fn descriptor(&self) -> FaultDescriptor {
        match (&self.kind[..], self.cause()) {
            (INVOCATION_KIND, Some(inner)) => FaultDescriptor::from(inner),
            _ => FaultDescriptor::from(self),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.kind, message),
            None => f.write_str(&self.kind),
        }
    }
}

impl<E> From<E> for Fault
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Fault::from_error(&err)
    }
}

/// Kind name and message of a fault, the pair compared by exception-expectation checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultDescriptor {
    pub kind_name: String,
    pub message: Option<String>,
}

impl FaultDescriptor {
    pub fn new(kind_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind_name: kind_name.into(),
            message: Some(message.into()),
        }
    }

    pub fn kind_only(kind_name: impl Into<String>) -> Self {
        Self {
            kind_name: kind_name.into(),
            message: None,
        }
    }

    /// The message, or `null` when there is none.
    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("null")
    }
}

impl fmt::Display for FaultDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.kind_name, message),
            None => f.write_str(&self.kind_name),
        }
    }
}

impl From<&Fault> for FaultDescriptor {
    fn from(fault: &Fault) -> Self {
        Self {
            kind_name: fault.kind.clone(),
            message: fault.message.clone(),
        }
    }
}

impl From<(&str, &str)> for FaultDescriptor {
    fn from((kind, message): (&str, &str)) -> Self {
        FaultDescriptor::new(kind, message)
    }
}

impl From<&str> for FaultDescriptor {
    fn from(kind: &str) -> Self {
        FaultDescriptor::kind_only(kind)
    }
}

/// Silence the default panic message for unwinds that carry a [`Fault`].
///
/// Faults raised with [`Fault::raise`] are expected control flow for exception-expectation checks; every other
/// panic is still reported by the previously installed hook.
pub fn quiet_fault_panics() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if info.payload().downcast_ref::<Fault>().is_none() {
            previous(info);
        }
    }));
}

/// `core::num::error::ParseIntError` -> `ParseIntError`.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
