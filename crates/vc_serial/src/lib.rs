#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod hash;
mod input;
mod output;
mod serializer;

pub mod builtins;
pub mod codec;
pub mod desc;
pub mod named;
pub mod registry;
pub mod value;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::{ProtocolViolation, SerialError};
pub use input::{ElementRead, Input, READ_ALL, READ_DONE};
pub use output::Output;
pub use serializer::{Loader, Saver, Serializable, Serializer};
pub use value::{Value, ValueInput, ValueOutput};
