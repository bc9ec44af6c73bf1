//! Method resolution by name and argument types.

use miette::Diagnostic;
use thiserror::Error;

use nutest_core::types::{self, TypeDesc};

use super::{ClassInfo, MethodEntry};

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("no method named `{method}` in the class {class}")]
    #[diagnostic(code(nutest::resolve::no_such_method))]
    NoSuchMethod { class: String, method: String },

    #[error("method `{method}` in the class {class} has no signature matching {signature}")]
    #[diagnostic(
        code(nutest::resolve::no_matching_signature),
        help("declared signatures: {candidates}")
    )]
    NoMatchingSignature {
        class: String,
        method: String,
        signature: String,
        candidates: String,
    },
}

/// A resolved method, borrowed from its class table.
#[derive(Debug, Clone, Copy)]
pub struct MethodHandle<'a> {
    pub class: &'a ClassInfo,
    pub entry: &'a MethodEntry,
}

pub struct MethodResolver;

impl MethodResolver {
    /// Find the first method named `method` whose parameters accept `arg_types`.
    ///
    /// ## Parameters
    /// - `class`: the subject's table, own entries first, then inherited ones
    /// - `arg_types`: runtime types of the supplied arguments
    ///
    /// ## Notes
    /// - Candidates are tried in table order and the first compatible one wins; there is no overload ranking.
    /// - Positions are compared with the primitive/boxed compatibility table and the comparison stops at the
    ///   first mismatching position.
    #[tracing::instrument(skip_all, fields(class = class.name, method = method))]
    pub fn resolve<'a>(
        class: &'a ClassInfo,
        method: &str,
        arg_types: &[TypeDesc],
    ) -> Result<MethodHandle<'a>, ResolutionError> {
        let mut candidates = class.methods_named(method).peekable();
        if candidates.peek().is_none() {
            tracing::debug!("no method with this name");
            return Err(ResolutionError::NoSuchMethod {
                class: class.name.to_string(),
                method: method.to_string(),
            });
        }

        let mut declared = Vec::new();
        for entry in candidates {
            if types::signature_matches(&entry.params, arg_types) {
                tracing::debug!(declared_in = entry.declared_in, "resolved");
                return Ok(MethodHandle { class, entry });
            }
            declared.push(entry.signature().to_string());
        }

        Err(ResolutionError::NoMatchingSignature {
            class: class.name.to_string(),
            method: method.to_string(),
            signature: format!("{}{}", method, types::render_list(arg_types)),
            candidates: declared.join(", "),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reflect::{ClassBuilder, Visibility};
    use crate::value::ToValue;
    use nutest_core::types::PrimitiveId;

    struct Calc;

    fn calc() -> ClassInfo {
        ClassBuilder::<Calc>::new("Calc")
            .method("add", vec![TypeDesc::Boxed(PrimitiveId::I32)], Visibility::Private, |_, _| {
                Ok(1.to_value())
            })
            .method("add", vec![TypeDesc::named("String")], Visibility::Public, |_, _| {
                Ok(2.to_value())
            })
            .method("add", vec![TypeDesc::Primitive(PrimitiveId::I32)], Visibility::Public, |_, _| {
                Ok(3.to_value())
            })
            .build()
    }

    #[test]
    fn test_first_compatible_declaration_wins() {
        let info = calc();
        let handle = MethodResolver::resolve(&info, "add", &[TypeDesc::Primitive(PrimitiveId::I32)]).unwrap();
        assert_eq!(handle.entry.params, vec![TypeDesc::Boxed(PrimitiveId::I32)]);
    }

    #[test]
    fn test_handle_outlives_the_requested_name() {
        let info = calc();
        let handle = {
            let name = String::from("add");
            MethodResolver::resolve(&info, &name, &[TypeDesc::named("String")]).unwrap()
        };
        assert_eq!(handle.entry.name, "add");
        assert_eq!(handle.entry.params, vec![TypeDesc::named("String")]);
    }

    #[test]
    fn test_no_such_method() {
        let info = calc();
        let err = MethodResolver::resolve(&info, "sub", &[]).unwrap_err();
        assert_eq!(err.to_string(), "no method named `sub` in the class Calc");
    }

    #[test]
    fn test_no_matching_signature_lists_candidates() {
        let info = calc();
        let err = MethodResolver::resolve(&info, "add", &[TypeDesc::Primitive(PrimitiveId::I64)]).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::NoMatchingSignature {
                class: "Calc".to_string(),
                method: "add".to_string(),
                signature: "add(i64)".to_string(),
                candidates: "add(Box<i32>), add(String), add(i32)".to_string(),
            }
        );
    }
}
