//! Calling resolved methods with every fault captured.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::engine::Tester;
use crate::fault::{Fault, ILLEGAL_ARGUMENT_KIND};
use crate::value::Value;

use super::{Handler, MethodEntry, MethodHandle};

/// Result of invoking a plain method.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Returned(Value),
    /// The method faulted; the fault is wrapped once as an invocation fault.
    Faulted(Fault),
}

pub struct Invoker;

impl Invoker {
    /// Invoke a resolved plain method. Returned errors and panics both become [`Invocation::Faulted`].
    pub fn invoke(handle: &MethodHandle<'_>, subject: &dyn Any, args: &[Value]) -> Invocation {
        let entry = handle.entry;
        let Handler::Method(method) = &entry.handler else {
            return Invocation::Faulted(Fault::invocation(
                entry.name,
                Fault::new(
                    ILLEGAL_ARGUMENT_KIND,
                    format!("`{}` is a test method and takes the tester", entry.name),
                ),
            ));
        };
        match panic::catch_unwind(AssertUnwindSafe(|| method(subject, args))) {
            Ok(Ok(value)) => Invocation::Returned(value),
            Ok(Err(fault)) => Invocation::Faulted(Fault::invocation(entry.name, fault)),
            Err(payload) => Invocation::Faulted(Fault::invocation(entry.name, Fault::from_panic(payload))),
        }
    }

    /// Run a discovered test method. A fault escaping the method body is returned unwrapped.
    pub fn invoke_test(entry: &MethodEntry, subject: &dyn Any, tester: &mut Tester) -> Result<(), Fault> {
        let Handler::Test(test) = &entry.handler else {
            return Err(Fault::new(
                ILLEGAL_ARGUMENT_KIND,
                format!("test method `{}` must take a single `&mut Tester` parameter", entry.name),
            ));
        };
        run_guarded(|| test(subject, tester))
    }
}

/// Run `body`, turning a panic into a fault.
pub(crate) fn run_guarded(body: impl FnOnce() -> Result<(), Fault>) -> Result<(), Fault> {
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| Err(Fault::from_panic(payload)))
}
