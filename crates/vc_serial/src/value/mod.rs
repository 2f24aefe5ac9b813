//! The boxed value used by untyped backends.
//!
//! - [`Value`]: closed tagged union over the scalar kinds, strings, an opaque
//!   byte escape hatch and nested records.
//! - [`Record`]: a boxed nested serializable, keyed by element name.
//! - [`ValueKind`]: the discriminant, used in error messages.
//! - [`ValueOutput`] / [`ValueInput`]: sessions that build and replay a value tree.

// -----------------------------------------------------------------------------
// Modules

mod tree;

// -----------------------------------------------------------------------------
// Exports

pub use tree::{ValueInput, ValueOutput};

// -----------------------------------------------------------------------------
// Value

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde_core::ser::SerializeMap;
use serde_core::{Serialize, Serializer};

use crate::SerialError;

/// A boxed value.
///
/// `Bytes` is an opaque slot for backends that need an untyped payload.
/// `Record` holds a nested serializable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Record(Record),
}

/// The kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Bytes,
    Record,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Record => "record",
        })
    }
}

impl Value {
    /// Returns the kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Byte(_) => ValueKind::Byte,
            Self::Short(_) => ValueKind::Short,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::Char(_) => ValueKind::Char,
            Self::String(_) => ValueKind::String,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Record(_) => ValueKind::Record,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the nested record, if this is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    fn mismatch(self, expected: ValueKind) -> SerialError {
        match self {
            Self::Null => SerialError::UnexpectedNull {
                expected: alloc::format!("{expected}"),
            },
            other => SerialError::TypeMismatch {
                expected,
                found: other.kind(),
            },
        }
    }
}

macro_rules! impl_value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = SerialError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other.mismatch(ValueKind::$variant)),
                    }
                }
            }
        )*
    };
}

impl_value_conversions! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => String,
    Vec<u8> => Bytes,
    Record => Record,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(String::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// -----------------------------------------------------------------------------
// Record

/// A boxed nested serializable value.
///
/// Elements keep the order they were written in; the element names
/// come from the class descriptor of `class`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    class: String,
    elements: Vec<(String, Value)>,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            elements: Vec::new(),
        }
    }

    /// Appends an element, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.elements.push((name.into(), value.into()));
    }

    /// The serial name of the boxed type.
    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Returns the first element called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.elements
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Returns the elements in write order.
    #[inline]
    pub fn elements(&self) -> &[(String, Value)] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn into_elements(self) -> Vec<(String, Value)> {
        self.elements
    }
}

// -----------------------------------------------------------------------------
// serde interop

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Byte(v) => serializer.serialize_i8(*v),
            Self::Short(v) => serializer.serialize_i16(*v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Long(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::Char(v) => serializer.serialize_char(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Bytes(v) => serializer.serialize_bytes(v),
            Self::Record(record) => record.serialize(serializer),
        }
    }
}

/// Records serialize as maps keyed by element name; the class name is
/// not emitted, matching how serde formats treat struct names.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(self.elements.len()))?;
        for (name, value) in &self.elements {
            state.serialize_entry(name, value)?;
        }
        state.end()
    }
}

/// Wraps a [`Record`] so the class name is kept as the single outer key.
pub struct NamedRecord<'a>(pub &'a Record);

impl Serialize for NamedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(1))?;
        state.serialize_entry(self.0.class(), self.0)?;
        state.end()
    }
}
