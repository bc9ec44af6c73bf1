//! Dynamic values passed through reflective invocation and assertions.
//!
//! Assertions compare, and narratives print, [`Value`]s rather than concrete Rust types. Three conversion traits
//! connect the two worlds:
//!
//! - [`ToValue`]: anything that can be asserted on or passed as an argument
//! - [`FromValue`]: argument decoding inside registered method handlers
//! - [`Typed`]: the static parameter descriptor of a Rust type, used by method resolution
//!
//! `#[derive(Record)]` implements all three for user structs.

use std::borrow::Cow;
use std::fmt;

use nutest_core::types::{PrimitiveId, TypeDesc};

use crate::fault::{Fault, ILLEGAL_ARGUMENT_KIND};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// A boxed primitive (`Box<i32>`, `Option<i32>`).
    Boxed(Box<Value>),
    Str(String),
    List(Vec<Value>),
    Record {
        class: String,
        fields: Vec<(String, Value)>,
    },
    /// A value the harness can only name, not look inside.
    Opaque(String),
}

impl Value {
    /// Runtime type descriptor, used as the argument type during method resolution.
    pub fn type_desc(&self) -> TypeDesc {
        match self {
            Value::Null => TypeDesc::Null,
            Value::Boxed(inner) => inner.type_desc().boxed(),
            Value::Str(_) => TypeDesc::named("String"),
            Value::List(_) => TypeDesc::named("Vec"),
            Value::Record { class, .. } => TypeDesc::Named(Cow::Owned(class.clone())),
            Value::Opaque(name) => TypeDesc::Named(Cow::Owned(name.clone())),
            primitive => match primitive.primitive_id() {
                Some(id) => TypeDesc::Primitive(id),
                None => TypeDesc::Null,
            },
        }
    }

    fn primitive_id(&self) -> Option<PrimitiveId> {
        Some(match self {
            Value::Bool(_) => PrimitiveId::Bool,
            Value::Char(_) => PrimitiveId::Char,
            Value::Byte(_) => PrimitiveId::I8,
            Value::Short(_) => PrimitiveId::I16,
            Value::Int(_) => PrimitiveId::I32,
            Value::Long(_) => PrimitiveId::I64,
            Value::Float(_) => PrimitiveId::F32,
            Value::Double(_) => PrimitiveId::F64,
            _ => return None,
        })
    }

    /// Wrap a primitive in its boxed form; other values are returned unchanged.
    pub fn boxed(self) -> Value {
        if self.primitive_id().is_some() {
            Value::Boxed(Box::new(self))
        } else {
            self
        }
    }

    /// Strip any number of `Boxed` layers.
    pub fn unboxed(&self) -> &Value {
        let mut value = self;
        while let Value::Boxed(inner) = value {
            value = inner;
        }
        value
    }

    pub fn is_null(&self) -> bool {
        matches!(self.unboxed(), Value::Null)
    }

    /// Integer family value widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self.unboxed() {
            Value::Byte(v) => Some(i64::from(v)),
            Value::Short(v) => Some(i64::from(v)),
            Value::Int(v) => Some(i64::from(v)),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }

    /// Any numeric value converted to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self.unboxed() {
            Value::Float(v) => Some(f64::from(v)),
            Value::Double(v) => Some(v),
            ref other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Field of a record value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self.unboxed() {
            Value::Record { fields, .. } => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v:?}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::Boxed(inner) => write!(f, "{inner}"),
            Value::Str(v) => write!(f, "{v:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record { class, fields } if fields.is_empty() => f.write_str(class),
            Value::Record { class, fields } => {
                write!(f, "{class} {{ ")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str(" }")
            }
            Value::Opaque(name) => write!(f, "<{name}>"),
        }
    }
}

// ============================================================================
// ToValue
// ============================================================================

pub trait ToValue {
    fn to_value(&self) -> Value;
}

macro_rules! to_value_as {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }
            }
        )*
    };
}

to_value_as!(
    bool => Bool,
    char => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
);

impl ToValue for u8 {
    fn to_value(&self) -> Value {
        Value::Short(i16::from(*self))
    }
}

impl ToValue for u16 {
    fn to_value(&self) -> Value {
        Value::Int(i32::from(*self))
    }
}

impl ToValue for u32 {
    fn to_value(&self) -> Value {
        Value::Long(i64::from(*self))
    }
}

macro_rules! to_value_wide {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(v) => Value::Long(v),
                        Err(_) => Value::Double(*self as f64),
                    }
                }
            }
        )*
    };
}

to_value_wide!(u64, usize, isize, i128, u128);

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        self.as_ref().to_value().boxed()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value().boxed(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::Null
    }
}

// ============================================================================
// FromValue
// ============================================================================

pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, Fault>;
}

fn mismatch(expected: &str, found: &Value) -> Fault {
    Fault::new(
        ILLEGAL_ARGUMENT_KIND,
        format!("expected {expected}, found {}", found.type_desc()),
    )
}

macro_rules! from_value_as {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, Fault> {
                    match value.unboxed() {
                        Value::$variant(v) => Ok(*v),
                        other => Err(mismatch(stringify!($ty), other)),
                    }
                }
            }
        )*
    };
}

from_value_as!(
    bool => Bool,
    char => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
);

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, Fault> {
        match value {
            Value::Str(v) => Ok(v.clone()),
            other => Err(mismatch("String", other)),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, Fault> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch("Vec", other)),
        }
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value) -> Result<Self, Fault> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, Fault> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, Fault> {
        Ok(value.clone())
    }
}

/// Fields of a record value of class `class`.
#[doc(hidden)]
pub fn record_fields<'a>(value: &'a Value, class: &str) -> Result<&'a [(String, Value)], Fault> {
    match value.unboxed() {
        Value::Record { class: found, fields } if found == class => Ok(fields.as_slice()),
        other => Err(mismatch(class, other)),
    }
}

/// Decode one named field of a record.
#[doc(hidden)]
pub fn field<T: FromValue>(fields: &[(String, Value)], name: &str) -> Result<T, Fault> {
    let value = fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v)
        .ok_or_else(|| Fault::new(ILLEGAL_ARGUMENT_KIND, format!("missing field `{name}`")))?;
    T::from_value(value)
}

// ============================================================================
// Typed
// ============================================================================

/// Static type descriptor of a parameter type.
pub trait Typed {
    fn type_desc() -> TypeDesc;
}

macro_rules! typed_primitive {
    ($($ty:ty => $id:ident),* $(,)?) => {
        $(
            impl Typed for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::Primitive(PrimitiveId::$id)
                }
            }
        )*
    };
}

typed_primitive!(
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

impl Typed for String {
    fn type_desc() -> TypeDesc {
        TypeDesc::named("String")
    }
}

impl<T> Typed for Vec<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::named("Vec")
    }
}

impl<T: Typed> Typed for Box<T> {
    fn type_desc() -> TypeDesc {
        T::type_desc().boxed()
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_desc() -> TypeDesc {
        T::type_desc().boxed()
    }
}

/// Build an argument vector: `args![5, "abc", book]`.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::value::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::ToValue::to_value(&$arg)),+]
    };
}
