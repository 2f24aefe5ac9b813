//! Name-keyed backends.
//!
//! Backends that store values under string keys (property maps, form
//! fields, flat configuration files) implement [`NamedOutput`] and
//! [`NamedInput`]; [`NamedValueOutput`] and [`NamedValueInput`] adapt them
//! to the index-addressed [`Output`](crate::Output) and [`Input`](crate::Input)
//! protocols.
//!
//! The adapters keep one cursor: the `(descriptor, index)` pair set by
//! `write_element` or returned by `read_element`. The next unfused value
//! call consumes it. Fused element calls resolve the name directly.
//!
//! Nested serializables are stored as one boxed [`Value`](crate::Value)
//! under their element name.
//!
//! [`PropertyMap`] is the stock backend.

// -----------------------------------------------------------------------------
// Modules

mod input;
mod output;
mod property_map;

// -----------------------------------------------------------------------------
// Exports

pub use input::{NamedInput, NamedValueInput};
pub use output::{NamedOutput, NamedValueOutput};
pub use property_map::{PropertyMap, PropertyMapInput, PropertyMapOutput, PropertyMapReader};

// -----------------------------------------------------------------------------
// Internal

use alloc::borrow::Cow;
use alloc::string::ToString;

use crate::desc::ClassDesc;
use crate::error::ProtocolViolation;
use crate::SerialError;

type Cursor = Option<(&'static dyn ClassDesc, usize)>;

fn resolve_name(desc: &'static dyn ClassDesc, index: usize) -> Result<Cow<'static, str>, SerialError> {
    desc.element_name(index).ok_or_else(|| {
        ProtocolViolation::IndexOutOfRange {
            class: desc.name().to_string(),
            index,
            count: desc.element_count(None),
        }
        .into()
    })
}

fn take_name(cursor: &mut Cursor) -> Result<Cow<'static, str>, SerialError> {
    match cursor.take() {
        Some((desc, index)) => resolve_name(desc, index),
        None => Err(ProtocolViolation::NoElementAddressed.into()),
    }
}
