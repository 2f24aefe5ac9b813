use alloc::string::String;

use crate::desc::ClassDesc;
use crate::error::ProtocolViolation;
use crate::input::{ElementRead, Input};
use crate::named::{resolve_name, take_name, Cursor};
use crate::serializer::Loader;
use crate::value::{Value, ValueInput};
use crate::SerialError;

// -----------------------------------------------------------------------------
// NamedInput

/// A backend that looks values up by element name.
///
/// [`next_element_name`](NamedInput::next_element_name) enumerates the names
/// present in the backend, in any order. Everything else reads a named value.
pub trait NamedInput {
    /// Returns the next stored name, or `None` when all were delivered.
    fn next_element_name(
        &mut self,
        desc: &'static dyn ClassDesc,
    ) -> Result<Option<String>, SerialError>;

    /// Discards a stored value the descriptor does not know.
    fn skip_named(&mut self, name: &str) -> Result<(), SerialError> {
        let _ = name;
        Ok(())
    }

    fn read_named(&mut self, name: &str) -> Result<Value, SerialError> {
        let _ = name;
        Err(SerialError::unsupported("read_named"))
    }

    /// Returns `false` if the value stored under `name` is null.
    fn read_named_not_null(&mut self, name: &str) -> Result<bool, SerialError> {
        let _ = name;
        Ok(true)
    }

    fn read_named_nullable(&mut self, name: &str) -> Result<Option<Value>, SerialError> {
        if self.read_named_not_null(name)? {
            self.read_named(name).map(Some)
        } else {
            Ok(None)
        }
    }

    fn read_named_bool(&mut self, name: &str) -> Result<bool, SerialError> {
        self.read_named(name)?.try_into()
    }

    fn read_named_byte(&mut self, name: &str) -> Result<i8, SerialError> {
        self.read_named(name)?.try_into()
    }

    fn read_named_short(&mut self, name: &str) -> Result<i16, SerialError> {
        self.read_named(name)?.try_into()
    }

    fn read_named_int(&mut self, name: &str) -> Result<i32, SerialError> {
        self.read_named(name)?.try_into()
    }

    fn read_named_long(&mut self, name: &str) -> Result<i64, SerialError> {
        self.read_named(name)?.try_into()
    }

    fn read_named_float(&mut self, name: &str) -> Result<f32, SerialError> {
        self.read_named(name)?.try_into()
    }

    fn read_named_double(&mut self, name: &str) -> Result<f64, SerialError> {
        self.read_named(name)?.try_into()
    }

    fn read_named_char(&mut self, name: &str) -> Result<char, SerialError> {
        self.read_named(name)?.try_into()
    }

    fn read_named_string(&mut self, name: &str) -> Result<String, SerialError> {
        self.read_named(name)?.try_into()
    }

    /// Reads a nested serializable, unboxed from a [`Value`] tree by default.
    fn read_named_serializable<T, L: Loader<T> + ?Sized>(
        &mut self,
        name: &str,
        loader: &L,
    ) -> Result<T, SerialError> {
        let boxed = self.read_named(name)?;
        ValueInput::decode(boxed, loader)
    }

    fn read_named_nullable_serializable<T, L: Loader<T> + ?Sized>(
        &mut self,
        name: &str,
        loader: &L,
    ) -> Result<Option<T>, SerialError> {
        if self.read_named_not_null(name)? {
            self.read_named_serializable(name, loader).map(Some)
        } else {
            Ok(None)
        }
    }
}

// -----------------------------------------------------------------------------
// NamedValueInput

/// Adapts a [`NamedInput`] to the [`Input`] protocol.
///
/// [`read_element`](Input::read_element) walks the backend's names, maps
/// them through the descriptor and skips the ones it does not own.
pub struct NamedValueInput<B> {
    backend: B,
    last: Cursor,
}

impl<B> NamedValueInput<B> {
    #[inline]
    pub const fn new(backend: B) -> Self {
        Self { backend, last: None }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn into_inner(self) -> B {
        self.backend
    }
}

macro_rules! forward_typed_reads {
    ($($ty:ty => $unfused:ident, $fused:ident, $named:ident;)*) => {$(
        fn $unfused(&mut self) -> Result<$ty, SerialError> {
            let name = take_name(&mut self.last)?;
            self.backend.$named(&name)
        }

        fn $fused(
            &mut self,
            desc: &'static dyn ClassDesc,
            index: usize,
        ) -> Result<$ty, SerialError> {
            let name = resolve_name(desc, index)?;
            self.backend.$named(&name)
        }
    )*};
}

impl<B: NamedInput> Input for NamedValueInput<B> {
    fn read_element(&mut self, desc: &'static dyn ClassDesc) -> Result<ElementRead, SerialError> {
        while let Some(name) = self.backend.next_element_name(desc)? {
            match desc.element_index(&name) {
                Some(index) => {
                    self.last = Some((desc, index));
                    return Ok(ElementRead::Index(index));
                }
                None => {
                    log::debug!("skipping unknown element `{name}` of `{}`", desc.name());
                    self.backend.skip_named(&name)?;
                }
            }
        }
        self.last = None;
        Ok(ElementRead::Done)
    }

    fn read_not_null_mark(&mut self) -> Result<bool, SerialError> {
        match self.last {
            Some((desc, index)) => {
                let name = resolve_name(desc, index)?;
                self.backend.read_named_not_null(&name)
            }
            None => Err(ProtocolViolation::NoElementAddressed.into()),
        }
    }

    fn read_null_value(&mut self) -> Result<(), SerialError> {
        take_name(&mut self.last)?;
        Ok(())
    }

    fn read_value(&mut self) -> Result<Value, SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.read_named(&name)
    }

    fn read_nullable_value(&mut self) -> Result<Option<Value>, SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.read_named_nullable(&name)
    }

    forward_typed_reads! {
        bool => read_bool_value, read_bool_element_value, read_named_bool;
        i8 => read_byte_value, read_byte_element_value, read_named_byte;
        i16 => read_short_value, read_short_element_value, read_named_short;
        i32 => read_int_value, read_int_element_value, read_named_int;
        i64 => read_long_value, read_long_element_value, read_named_long;
        f32 => read_float_value, read_float_element_value, read_named_float;
        f64 => read_double_value, read_double_element_value, read_named_double;
        char => read_char_value, read_char_element_value, read_named_char;
        String => read_string_value, read_string_element_value, read_named_string;
    }

    fn read_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<Value, SerialError> {
        let name = resolve_name(desc, index)?;
        self.backend.read_named(&name)
    }

    fn read_nullable_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<Option<Value>, SerialError> {
        let name = resolve_name(desc, index)?;
        self.backend.read_named_nullable(&name)
    }

    fn read_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<T, SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.read_named_serializable(&name, loader)
    }

    fn read_nullable_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<Option<T>, SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.read_named_nullable_serializable(&name, loader)
    }

    fn read_serializable_element_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        loader: &L,
    ) -> Result<T, SerialError> {
        let name = resolve_name(desc, index)?;
        self.backend.read_named_serializable(&name, loader)
    }

    fn read_nullable_serializable_element_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        loader: &L,
    ) -> Result<Option<T>, SerialError> {
        let name = resolve_name(desc, index)?;
        self.backend.read_named_nullable_serializable(&name, loader)
    }
}
