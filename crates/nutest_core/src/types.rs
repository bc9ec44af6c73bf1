//! Primitive/boxed type vocabulary.
//!
//! Method resolution matches argument types against declared parameter types by name. When the names differ, the
//! compatibility table below decides whether a primitive and its boxed form may stand in for each other
//! (`i32` against `Box<i32>`, or the classic `int` against `Integer`).
//!
//! ## Notes
//! - Lookup via [`from_str`] and [`boxed_from_str`] is **case-sensitive**.
//! - A primitive never widens to another primitive: `i32` is not compatible with `i64`.
//! - This module is vocabulary only. Decoding values is the harness's job.
//!
//! ## Examples
//! ```rust
//! use nutest_core::types::{self, PrimitiveId, TypeDesc};
//!
//! assert_eq!(types::from_str("int"), Some(PrimitiveId::I32));
//! assert_eq!(types::boxed_str(PrimitiveId::I32), "Box<i32>");
//! assert!(types::compatible(&TypeDesc::Boxed(PrimitiveId::I32), &TypeDesc::Primitive(PrimitiveId::I32)));
//! assert!(!types::compatible(&TypeDesc::Primitive(PrimitiveId::I64), &TypeDesc::Primitive(PrimitiveId::I32)));
//! ```

use std::borrow::Cow;
use std::fmt;

/// Stable identifier for a primitive value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveId {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

/// Metadata for one row of the compatibility table.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveInfo {
    pub id: PrimitiveId,
    /// Rust spelling of the primitive (e.g. `"i32"`).
    pub canonical: &'static str,
    /// Rust spelling of the boxed form (e.g. `"Box<i32>"`).
    pub boxed: &'static str,
    /// Classic primitive spellings accepted as aliases (e.g. `"int"`).
    pub aliases: &'static [&'static str],
    /// Classic wrapper spellings accepted as boxed aliases (e.g. `"Integer"`).
    pub boxed_aliases: &'static [&'static str],
    pub description: &'static str,
}

/// The primitive/boxed compatibility table.
pub const PRIMITIVES: &[PrimitiveInfo] = &[
    info(
        PrimitiveId::Bool,
        "bool",
        "Box<bool>",
        &["boolean"],
        &["Boolean"],
        "Boolean truth value.",
    ),
    info(
        PrimitiveId::Char,
        "char",
        "Box<char>",
        &[],
        &["Character"],
        "Unicode scalar value.",
    ),
    info(
        PrimitiveId::I8,
        "i8",
        "Box<i8>",
        &["byte"],
        &["Byte"],
        "8-bit signed integer.",
    ),
    info(
        PrimitiveId::I16,
        "i16",
        "Box<i16>",
        &["short"],
        &["Short"],
        "16-bit signed integer.",
    ),
    info(
        PrimitiveId::I32,
        "i32",
        "Box<i32>",
        &["int"],
        &["Integer"],
        "32-bit signed integer.",
    ),
    info(
        PrimitiveId::I64,
        "i64",
        "Box<i64>",
        &["long"],
        &["Long"],
        "64-bit signed integer.",
    ),
    info(
        PrimitiveId::F32,
        "f32",
        "Box<f32>",
        &["float"],
        &["Float"],
        "32-bit floating point number.",
    ),
    info(
        PrimitiveId::F64,
        "f64",
        "Box<f64>",
        &["double"],
        &["Double"],
        "64-bit floating point number.",
    ),
];

/// Resolve a primitive spelling (canonical or alias) to a [`PrimitiveId`].
pub fn from_str(name: &str) -> Option<PrimitiveId> {
    PRIMITIVES
        .iter()
        .find(|p| p.canonical == name || p.aliases.contains(&name))
        .map(|p| p.id)
}

/// Resolve a boxed spelling (canonical or alias) to the [`PrimitiveId`] it wraps.
pub fn boxed_from_str(name: &str) -> Option<PrimitiveId> {
    PRIMITIVES
        .iter()
        .find(|p| p.boxed == name || p.boxed_aliases.contains(&name))
        .map(|p| p.id)
}

/// Return the canonical primitive spelling (e.g. `"i32"`).
pub fn as_str(id: PrimitiveId) -> &'static str {
    info_for(id).canonical
}

/// Return the canonical boxed spelling (e.g. `"Box<i32>"`).
pub fn boxed_str(id: PrimitiveId) -> &'static str {
    info_for(id).boxed
}

/// Return the full metadata entry for a primitive.
///
/// ## Panics
/// - If the table is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: PrimitiveId) -> &'static PrimitiveInfo {
    PRIMITIVES
        .iter()
        .find(|p| p.id == id)
        .expect("primitive type info missing")
}

const fn info(
    id: PrimitiveId,
    canonical: &'static str,
    boxed: &'static str,
    aliases: &'static [&'static str],
    boxed_aliases: &'static [&'static str],
    description: &'static str,
) -> PrimitiveInfo {
    PrimitiveInfo {
        id,
        canonical,
        boxed,
        aliases,
        boxed_aliases,
        description,
    }
}

/// Descriptor of a parameter or argument type, the key used during method resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// A primitive value type (`i32`).
    Primitive(PrimitiveId),
    /// The boxed form of a primitive (`Box<i32>`).
    Boxed(PrimitiveId),
    /// Any other type, identified by name (`String`, `Vec`, a record class).
    Named(Cow<'static, str>),
    /// The type of a null argument.
    Null,
}

impl TypeDesc {
    /// Build a named descriptor.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        TypeDesc::Named(name.into())
    }

    /// Parse a type spelling, recognizing primitive and boxed spellings from the table.
    ///
    /// ## Examples
    /// ```rust
    /// use nutest_core::types::{PrimitiveId, TypeDesc};
    ///
    /// assert_eq!(TypeDesc::parse("long"), TypeDesc::Primitive(PrimitiveId::I64));
    /// assert_eq!(TypeDesc::parse("Integer"), TypeDesc::Boxed(PrimitiveId::I32));
    /// assert_eq!(TypeDesc::parse("String"), TypeDesc::named("String"));
    /// ```
    pub fn parse(name: &str) -> Self {
        if name == "null" {
            TypeDesc::Null
        } else if let Some(id) = from_str(name) {
            TypeDesc::Primitive(id)
        } else if let Some(id) = boxed_from_str(name) {
            TypeDesc::Boxed(id)
        } else {
            TypeDesc::Named(Cow::Owned(name.to_string()))
        }
    }

    /// Return the boxed form of a primitive descriptor; other descriptors are returned unchanged.
    pub fn boxed(self) -> Self {
        match self {
            TypeDesc::Primitive(id) => TypeDesc::Boxed(id),
            other => other,
        }
    }

    /// Return the canonical spelling of this descriptor.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            TypeDesc::Primitive(id) => Cow::Borrowed(as_str(*id)),
            TypeDesc::Boxed(id) => Cow::Borrowed(boxed_str(*id)),
            TypeDesc::Named(name) => Cow::Borrowed(name.as_ref()),
            TypeDesc::Null => Cow::Borrowed("null"),
        }
    }

    /// The primitive a descriptor stands for, if it is a primitive or a boxed primitive.
    pub fn primitive_form(&self) -> Option<PrimitiveId> {
        match self {
            TypeDesc::Primitive(id) | TypeDesc::Boxed(id) => Some(*id),
            TypeDesc::Named(_) | TypeDesc::Null => None,
        }
    }

    /// Whether a value of this type can be null (boxed and named types).
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeDesc::Boxed(_) | TypeDesc::Named(_))
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Decide whether an argument of type `arg` may be passed where `param` is declared.
///
/// ## Rules
/// - Exact spelling equality always matches.
/// - Otherwise both sides are reduced to their primitive form; they match when both have one and it is the same.
/// - A null argument matches boxed and named parameters only.
///
/// The primitive reduction applies to both sides, so a boxed parameter accepts its primitive argument and a
/// primitive parameter accepts its boxed argument. Callers pass either form and reach the same declaration.
pub fn compatible(param: &TypeDesc, arg: &TypeDesc) -> bool {
    if param.name() == arg.name() {
        return true;
    }
    if *arg == TypeDesc::Null {
        return param.is_reference();
    }
    match (param.primitive_form(), arg.primitive_form()) {
        (Some(p), Some(a)) => p == a,
        _ => false,
    }
}

/// Check a whole parameter list against argument types, stopping at the first mismatching position.
pub fn signature_matches(params: &[TypeDesc], args: &[TypeDesc]) -> bool {
    params.len() == args.len() && params.iter().zip(args).all(|(p, a)| compatible(p, a))
}

/// Render a parameter list as `(i32, String)`.
pub fn render_list(types: &[TypeDesc]) -> String {
    let names: Vec<String> = types.iter().map(|t| t.name().into_owned()).collect();
    format!("({})", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_param_accepts_primitive_arg() {
        for info in PRIMITIVES {
            assert!(compatible(&TypeDesc::Boxed(info.id), &TypeDesc::Primitive(info.id)));
            assert!(compatible(&TypeDesc::Primitive(info.id), &TypeDesc::Boxed(info.id)));
        }
    }

    #[test]
    fn test_no_widening_between_primitives() {
        assert!(!compatible(
            &TypeDesc::Primitive(PrimitiveId::I64),
            &TypeDesc::Primitive(PrimitiveId::I32)
        ));
        assert!(!compatible(
            &TypeDesc::Boxed(PrimitiveId::F64),
            &TypeDesc::Primitive(PrimitiveId::F32)
        ));
    }

    #[test]
    fn test_named_types_match_by_name_only() {
        assert!(compatible(&TypeDesc::named("String"), &TypeDesc::parse("String")));
        assert!(!compatible(&TypeDesc::named("String"), &TypeDesc::Primitive(PrimitiveId::Char)));
        assert!(!compatible(&TypeDesc::named("Book"), &TypeDesc::named("Shelf")));
    }

    #[test]
    fn test_null_matches_reference_params_only() {
        assert!(compatible(&TypeDesc::named("String"), &TypeDesc::Null));
        assert!(compatible(&TypeDesc::Boxed(PrimitiveId::I32), &TypeDesc::Null));
        assert!(!compatible(&TypeDesc::Primitive(PrimitiveId::I32), &TypeDesc::Null));
    }

    #[test]
    fn test_signature_checks_every_position() {
        let params = [TypeDesc::Boxed(PrimitiveId::I32), TypeDesc::named("String")];
        let good = [TypeDesc::Primitive(PrimitiveId::I32), TypeDesc::named("String")];
        let bad = [TypeDesc::Primitive(PrimitiveId::I32), TypeDesc::Primitive(PrimitiveId::I32)];
        assert!(signature_matches(&params, &good));
        assert!(!signature_matches(&params, &bad));
        assert!(!signature_matches(&params, &good[..1]));
    }

    #[test]
    fn test_parse_round_trips_canonical_spellings() {
        for info in PRIMITIVES {
            assert_eq!(TypeDesc::parse(info.canonical).name(), info.canonical);
            assert_eq!(TypeDesc::parse(info.boxed).name(), info.boxed);
        }
        assert_eq!(TypeDesc::parse("null"), TypeDesc::Null);
    }

    #[test]
    fn test_render_list() {
        let list = [TypeDesc::Primitive(PrimitiveId::I32), TypeDesc::named("String")];
        assert_eq!(render_list(&list), "(i32, String)");
        assert_eq!(render_list(&[]), "()");
    }
}
