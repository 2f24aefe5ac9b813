use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::value::ValueKind;

// -----------------------------------------------------------------------------
// SerialError

/// Errors produced while driving a save or load traversal.
///
/// Every variant is fatal to the traversal that raised it. Errors are
/// propagated unchanged to the caller of the top-level [`write`] or [`read`].
///
/// [`write`]: crate::Output::write
/// [`read`]: crate::Input::read
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SerialError {
    #[error("`{operation}` is not supported by this backend")]
    Unsupported { operation: &'static str },

    #[error("protocol violation: {0}")]
    Protocol(ProtocolViolation),

    #[error("element `{element}` of `{class}` was never delivered")]
    MissingElement { class: String, element: String },

    #[error("expected {expected} but found null")]
    UnexpectedNull { expected: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    #[error("{0}")]
    Custom(String),
}

impl SerialError {
    #[inline]
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    /// Creates a backend-specific error from any displayable message.
    pub fn custom(msg: impl fmt::Display) -> Self {
        Self::Custom(alloc::format!("{msg}"))
    }

    /// Returns `true` if this error reports a structural mismatch.
    #[inline]
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

impl From<ProtocolViolation> for SerialError {
    #[inline]
    fn from(value: ProtocolViolation) -> Self {
        Self::Protocol(value)
    }
}

// -----------------------------------------------------------------------------
// ProtocolViolation

/// Structural mismatches between a codec and a backend or descriptor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtocolViolation {
    #[error("index {index} is outside `{class}` (element count {count})")]
    IndexOutOfRange {
        class: String,
        index: usize,
        count: usize,
    },

    #[error("element {index} of `{class}` was delivered twice")]
    DuplicateElement { class: String, index: usize },

    #[error("end of `{found}` does not match the open {}", display_open(.expected))]
    UnbalancedEnd {
        expected: Option<String>,
        found: String,
    },

    #[error("descriptor mismatch: expected `{expected}`, found `{found}`")]
    DescriptorMismatch { expected: String, found: String },

    #[error("a value was written or read before any element was addressed")]
    NoElementAddressed,

    #[error("element `{element}` of `{class}` was addressed but never filled")]
    UnfilledElement { class: String, element: String },

    #[error("`{class}` was begun but never ended")]
    Unterminated { class: String },

    #[error("no value is available at the cursor")]
    NoValue,

    #[error("a value remains after the traversal finished")]
    TrailingValue,

    #[error("`{0}` is neither an element index nor a read sentinel")]
    InvalidSentinel(i32),
}

fn display_open(expected: &Option<String>) -> String {
    match expected {
        Some(class) => alloc::format!("`{class}`"),
        None => String::from("nothing"),
    }
}
