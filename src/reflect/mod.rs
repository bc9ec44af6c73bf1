//! Explicit reflection registry.
//!
//! Rust has no runtime method lookup, so every subject type carries a [`ClassInfo`]: its name, its ancestor chain
//! and an ordered table of [`MethodEntry`]s mapping a name and parameter types to a type-erased handler. The table
//! is built once per type (normally by `#[subject]`) and resolved against by name and argument types.
//!
//! ## Notes
//! - Entries are ordered own declarations first, then inherited entries in ancestor order. Resolution takes the
//!   first match in this order.
//! - An own entry with the same name and parameter types as an inherited one replaces it.
//! - Visibility is recorded but never restricts resolution: private methods are callable.
//! - The aggregate [`Examples`] entry point is not inherited.

pub mod invoker;
pub mod resolver;

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use nutest_core::types::{self, TypeDesc};

use crate::engine::Tester;
use crate::fault::{Fault, ILLEGAL_ARGUMENT_KIND};
use crate::value::Value;

pub use invoker::{Invocation, Invoker};
pub use resolver::{MethodHandle, MethodResolver, ResolutionError};

/// Handler of a plain method: receiver, decoded arguments in; result value out.
pub type MethodFn = Arc<dyn Fn(&dyn Any, &[Value]) -> Result<Value, Fault> + Send + Sync>;

/// Handler of a test method: receiver and the run's tester in.
pub type TestFn = Arc<dyn Fn(&dyn Any, &mut Tester) -> Result<(), Fault> + Send + Sync>;

#[derive(Clone)]
pub enum Handler {
    Method(MethodFn),
    Test(TestFn),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Name plus ordered parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<TypeDesc>,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, types::render_list(&self.params))
    }
}

#[derive(Clone)]
pub struct MethodEntry {
    pub name: &'static str,
    pub params: Vec<TypeDesc>,
    pub visibility: Visibility,
    /// Explicitly marked as a test method (`#[test_method]`).
    pub marked: bool,
    /// Class that declared the method (differs from the owning class for inherited entries).
    pub declared_in: &'static str,
    pub handler: Handler,
}

impl MethodEntry {
    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name.to_string(),
            params: self.params.clone(),
        }
    }

    /// Takes the tester as its single parameter.
    pub fn is_test_shaped(&self) -> bool {
        matches!(self.handler, Handler::Test(_))
    }

    /// Re-target this entry at a subclass reaching the declaring instance through `via`.
    fn project<S: Any, P: Any>(&self, class: &'static str, via: fn(&S) -> &P) -> MethodEntry {
        let handler = match &self.handler {
            Handler::Method(f) => {
                let f = Arc::clone(f);
                Handler::Method(Arc::new(move |subject: &dyn Any, args: &[Value]| {
                    let this = downcast::<S>(subject, class)?;
                    let parent: &dyn Any = via(this);
                    f(parent, args)
                }))
            }
            Handler::Test(f) => {
                let f = Arc::clone(f);
                Handler::Test(Arc::new(move |subject: &dyn Any, tester: &mut Tester| {
                    let this = downcast::<S>(subject, class)?;
                    let parent: &dyn Any = via(this);
                    f(parent, tester)
                }))
            }
        };
        MethodEntry {
            handler,
            ..self.clone()
        }
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("signature", &self.signature().to_string())
            .field("visibility", &self.visibility)
            .field("marked", &self.marked)
            .field("declared_in", &self.declared_in)
            .field("test", &self.is_test_shaped())
            .finish()
    }
}

pub struct ClassInfo {
    pub name: &'static str,
    /// Nearest ancestor first.
    pub ancestors: Vec<&'static str>,
    pub methods: Vec<MethodEntry>,
    /// Aggregate entry point of a subject implementing [`Examples`].
    pub aggregate: Option<TestFn>,
}

impl ClassInfo {
    /// Entries named `name`, in table order. The entries borrow from `self` only.
    pub fn methods_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a MethodEntry> + use<'a, 'n> {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("ancestors", &self.ancestors)
            .field("methods", &self.methods)
            .field("aggregate", &self.aggregate.is_some())
            .finish()
    }
}

/// A type the harness can resolve methods on and discover tests in.
pub trait Reflect: Any + Sized {
    fn class_info() -> &'static ClassInfo;

    /// Field rendering shown when a run prints its subject.
    fn inspect(&self) -> Value {
        Value::Opaque(Self::class_info().name.to_string())
    }
}

/// Capability interface: a single entry point running every test of the subject.
///
/// When a subject registers it, convention discovery is skipped.
pub trait Examples {
    fn tests(&self, t: &mut Tester);
}

/// Builds a [`ClassInfo`] for subject type `S`.
///
/// ## Examples
/// ```rust
/// use nutest::reflect::{ClassBuilder, Visibility};
/// use nutest::types::TypeDesc;
/// use nutest::value::{FromValue, ToValue};
///
/// struct Counter(i32);
///
/// let info = ClassBuilder::<Counter>::new("Counter")
///     .method("add", vec![TypeDesc::parse("i32")], Visibility::Public, |c: &Counter, args| {
///         Ok((c.0 + i32::from_value(&args[0])?).to_value())
///     })
///     .build();
/// assert_eq!(info.methods[0].signature().to_string(), "add(i32)");
/// ```
pub struct ClassBuilder<S> {
    name: &'static str,
    ancestors: Vec<&'static str>,
    own: Vec<MethodEntry>,
    inherited: Vec<MethodEntry>,
    aggregate: Option<TestFn>,
    _subject: PhantomData<fn(&S)>,
}

impl<S: Any> ClassBuilder<S> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ancestors: Vec::new(),
            own: Vec::new(),
            inherited: Vec::new(),
            aggregate: None,
            _subject: PhantomData,
        }
    }

    pub fn method<F>(mut self, name: &'static str, params: Vec<TypeDesc>, visibility: Visibility, f: F) -> Self
    where
        F: Fn(&S, &[Value]) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        let class = self.name;
        let handler: MethodFn = Arc::new(move |subject: &dyn Any, args: &[Value]| f(downcast::<S>(subject, class)?, args));
        self.own.push(MethodEntry {
            name,
            params,
            visibility,
            marked: false,
            declared_in: class,
            handler: Handler::Method(handler),
        });
        self
    }

    pub fn test<F>(mut self, name: &'static str, visibility: Visibility, f: F) -> Self
    where
        F: Fn(&S, &mut Tester) -> Result<(), Fault> + Send + Sync + 'static,
    {
        let class = self.name;
        let handler: TestFn =
            Arc::new(move |subject: &dyn Any, tester: &mut Tester| f(downcast::<S>(subject, class)?, tester));
        self.own.push(MethodEntry {
            name,
            params: vec![TypeDesc::named(Tester::TYPE_NAME)],
            visibility,
            marked: false,
            declared_in: class,
            handler: Handler::Test(handler),
        });
        self
    }

    /// Mark every own entry named `name` as an explicit test method.
    pub fn mark(mut self, name: &str) -> Self {
        for entry in self.own.iter_mut().filter(|e| e.name == name) {
            entry.marked = true;
        }
        self
    }

    /// Inherit the registered methods of `P`, reached through `via`.
    pub fn extends<P: Reflect>(mut self, via: fn(&S) -> &P) -> Self {
        let parent = P::class_info();
        self.ancestors.push(parent.name);
        self.ancestors.extend(parent.ancestors.iter().copied());
        let class = self.name;
        self.inherited
            .extend(parent.methods.iter().map(|entry| entry.project(class, via)));
        self
    }

    /// Register the subject's [`Examples`] implementation as its aggregate entry point.
    pub fn examples(mut self) -> Self
    where
        S: Examples,
    {
        let class = self.name;
        self.aggregate = Some(Arc::new(move |subject: &dyn Any, tester: &mut Tester| {
            downcast::<S>(subject, class)?.tests(tester);
            Ok(())
        }));
        self
    }

    pub fn build(self) -> ClassInfo {
        let mut methods = self.own;
        let own_count = methods.len();
        for entry in self.inherited {
            let overridden = methods[..own_count]
                .iter()
                .any(|m| m.name == entry.name && m.params == entry.params);
            if !overridden {
                methods.push(entry);
            }
        }
        ClassInfo {
            name: self.name,
            ancestors: self.ancestors,
            methods,
            aggregate: self.aggregate,
        }
    }
}

fn downcast<'a, S: Any>(subject: &'a dyn Any, class: &str) -> Result<&'a S, Fault> {
    subject.downcast_ref::<S>().ok_or_else(|| {
        Fault::new(
            ILLEGAL_ARGUMENT_KIND,
            format!("receiver is not an instance of {class}"),
        )
    })
}

/// Check the argument count before decoding. Used by generated handlers.
#[doc(hidden)]
pub fn expect_arity(args: &[Value], arity: usize) -> Result<(), Fault> {
    if args.len() == arity {
        Ok(())
    } else {
        Err(Fault::new(
            ILLEGAL_ARGUMENT_KIND,
            format!("wrong number of arguments: expected {arity}, got {}", args.len()),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::value::{FromValue, ToValue};

    struct Base;
    struct Derived {
        base: Base,
    }

    impl Reflect for Base {
        fn class_info() -> &'static ClassInfo {
            static INFO: std::sync::OnceLock<ClassInfo> = std::sync::OnceLock::new();
            INFO.get_or_init(|| {
                ClassBuilder::<Base>::new("Base")
                    .method("name", vec![], Visibility::Public, |_, _| Ok("base".to_value()))
                    .method("twice", vec![TypeDesc::parse("i32")], Visibility::Private, |_, args| {
                        Ok((i32::from_value(&args[0])? * 2).to_value())
                    })
                    .build()
            })
        }
    }

    fn derived_info() -> ClassInfo {
        fn via(d: &Derived) -> &Base {
            &d.base
        }
        ClassBuilder::<Derived>::new("Derived")
            .method("name", vec![], Visibility::Public, |_, _| Ok("derived".to_value()))
            .extends::<Base>(via)
            .build()
    }

    fn call(entry: &MethodEntry, subject: &dyn Any, args: &[Value]) -> Value {
        match &entry.handler {
            Handler::Method(f) => f(subject, args).unwrap(),
            Handler::Test(_) => panic!("not a plain method"),
        }
    }

    #[test]
    fn test_override_shadows_inherited_entry() {
        let info = derived_info();
        let names: Vec<_> = info.methods.iter().map(|m| (m.name, m.declared_in)).collect();
        assert_eq!(names, vec![("name", "Derived"), ("twice", "Base")]);
        assert_eq!(info.ancestors, vec!["Base"]);
    }

    #[test]
    fn test_inherited_entry_runs_against_projection() {
        let info = derived_info();
        let subject = Derived { base: Base };
        let twice = info.methods_named("twice").next().unwrap();
        assert_eq!(call(twice, &subject, &[Value::Int(21)]), Value::Int(42));
        assert_eq!(call(&info.methods[0], &subject, &[]), "derived".to_value());
    }

    #[test]
    fn test_wrong_receiver_is_illegal_argument() {
        let info = Base::class_info();
        let Handler::Method(f) = &info.methods[0].handler else {
            panic!("expected a plain method");
        };
        let err = f(&42i32, &[]).unwrap_err();
        assert_eq!(err.kind(), ILLEGAL_ARGUMENT_KIND);
    }

    #[test]
    fn test_expect_arity() {
        assert!(expect_arity(&[], 0).is_ok());
        assert_eq!(
            expect_arity(&[Value::Null], 2).unwrap_err().message(),
            Some("wrong number of arguments: expected 2, got 1")
        );
    }
}
