use crate::desc::ClassDesc;
use crate::error::ProtocolViolation;
use crate::serializer::Loader;
use crate::value::{Value, ValueInput};
use crate::SerialError;

// -----------------------------------------------------------------------------
// Sentinels

/// Wire code of [`ElementRead::Done`]: no more elements.
pub const READ_DONE: i32 = -1;

/// Wire code of [`ElementRead::All`]: every element follows in index order.
pub const READ_ALL: i32 = -2;

/// The answer of [`Input::read_element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRead {
    /// The next value belongs to this element.
    Index(usize),
    /// No more elements, see [`READ_DONE`].
    Done,
    /// The backend delivers elements `0..N` in order without further
    /// negotiation, see [`READ_ALL`].
    All,
}

impl ElementRead {
    /// Returns the wire code: the index itself, [`READ_DONE`] or [`READ_ALL`].
    ///
    /// Returns `None` if the index does not fit into an `i32`.
    pub fn code(self) -> Option<i32> {
        match self {
            Self::Index(index) => i32::try_from(index).ok(),
            Self::Done => Some(READ_DONE),
            Self::All => Some(READ_ALL),
        }
    }

    /// Parses a wire code produced by [`code`](Self::code).
    pub fn from_code(code: i32) -> Result<Self, SerialError> {
        match code {
            READ_DONE => Ok(Self::Done),
            READ_ALL => Ok(Self::All),
            code => usize::try_from(code)
                .map(Self::Index)
                .map_err(|_| ProtocolViolation::InvalidSentinel(code).into()),
        }
    }
}

// -----------------------------------------------------------------------------
// Input

/// The reader contract, dual of [`Output`](crate::Output).
///
/// | Layer | Operations | Default |
/// |---|---|---|
/// | Delimiters | [`read_begin`], [`read_end`] | `true` / no-op |
/// | Cursor | [`read_element`] | [`ElementRead::All`] |
/// | Null | [`read_not_null_mark`], [`read_null_value`] | `true` / no-op |
/// | Core | [`read_value`] | [`Unsupported`] |
/// | Typed | `read_xxx_value` | [`read_value`] then a checked conversion |
/// | Fusion | `read_xxx_element_value` | `read_xxx_value` |
/// | Recursive | [`read_serializable_value`] | [`read_nullable_value`], unboxed through a [`ValueInput`] |
///
/// # Unordered reads
///
/// A codec calls [`read_begin`], then loops on [`read_element`]:
///
/// - [`ElementRead::All`]: read elements `0..N` in order, then stop.
/// - [`ElementRead::Index`]: read that element, then ask again.
/// - [`ElementRead::Done`]: stop.
///
/// and finishes with [`read_end`]. Backends with keyed or sparse data
/// return indices in their own order; strictly ordered ones return `All`.
/// See [`read_elements`](crate::codec::read_elements).
///
/// [`read_begin`]: Input::read_begin
/// [`read_end`]: Input::read_end
/// [`read_element`]: Input::read_element
/// [`read_not_null_mark`]: Input::read_not_null_mark
/// [`read_null_value`]: Input::read_null_value
/// [`read_value`]: Input::read_value
/// [`read_nullable_value`]: Input::read_nullable_value
/// [`read_serializable_value`]: Input::read_serializable_value
/// [`Unsupported`]: SerialError::Unsupported
pub trait Input {
    // ------------------------------------------------------------------ top-level

    /// Loads a value with `loader`, the only entry point for external callers.
    fn read<T, L: Loader<T> + ?Sized>(&mut self, loader: &L) -> Result<T, SerialError> {
        loader.load(self)
    }

    // ------------------------------------------------------------------ delimiters

    /// Opens a value of `desc`.
    ///
    /// Returns `false` if the backend found an inline null instead.
    fn read_begin(&mut self, desc: &'static dyn ClassDesc) -> Result<bool, SerialError> {
        let _ = desc;
        Ok(true)
    }

    fn read_end(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        let _ = desc;
        Ok(())
    }

    /// Returns the runtime length of a variable-arity value, if the backend knows it.
    fn read_size(&mut self, desc: &'static dyn ClassDesc) -> Result<Option<usize>, SerialError> {
        let _ = desc;
        Ok(None)
    }

    // ------------------------------------------------------------------ cursor

    fn read_element(&mut self, desc: &'static dyn ClassDesc) -> Result<ElementRead, SerialError> {
        let _ = desc;
        Ok(ElementRead::All)
    }

    // ------------------------------------------------------------------ null handling

    /// Returns `false` if the next value is null.
    fn read_not_null_mark(&mut self) -> Result<bool, SerialError> {
        Ok(true)
    }

    /// Consumes a null announced by [`read_not_null_mark`](Input::read_not_null_mark).
    fn read_null_value(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    // ------------------------------------------------------------------ core value

    fn read_value(&mut self) -> Result<Value, SerialError> {
        Err(SerialError::unsupported("read_value"))
    }

    fn read_nullable_value(&mut self) -> Result<Option<Value>, SerialError> {
        if self.read_not_null_mark()? {
            self.read_value().map(Some)
        } else {
            self.read_null_value()?;
            Ok(None)
        }
    }

    // ------------------------------------------------------------------ typed value

    fn read_bool_value(&mut self) -> Result<bool, SerialError> {
        self.read_value()?.try_into()
    }

    fn read_byte_value(&mut self) -> Result<i8, SerialError> {
        self.read_value()?.try_into()
    }

    fn read_short_value(&mut self) -> Result<i16, SerialError> {
        self.read_value()?.try_into()
    }

    fn read_int_value(&mut self) -> Result<i32, SerialError> {
        self.read_value()?.try_into()
    }

    fn read_long_value(&mut self) -> Result<i64, SerialError> {
        self.read_value()?.try_into()
    }

    fn read_float_value(&mut self) -> Result<f32, SerialError> {
        self.read_value()?.try_into()
    }

    fn read_double_value(&mut self) -> Result<f64, SerialError> {
        self.read_value()?.try_into()
    }

    fn read_char_value(&mut self) -> Result<char, SerialError> {
        self.read_value()?.try_into()
    }

    fn read_string_value(&mut self) -> Result<alloc::string::String, SerialError> {
        self.read_value()?.try_into()
    }

    // ------------------------------------------------------------------ element fusion

    fn read_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<Value, SerialError> {
        let _ = (desc, index);
        self.read_value()
    }

    fn read_nullable_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<Option<Value>, SerialError> {
        let _ = (desc, index);
        self.read_nullable_value()
    }

    fn read_bool_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<bool, SerialError> {
        let _ = (desc, index);
        self.read_bool_value()
    }

    fn read_byte_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<i8, SerialError> {
        let _ = (desc, index);
        self.read_byte_value()
    }

    fn read_short_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<i16, SerialError> {
        let _ = (desc, index);
        self.read_short_value()
    }

    fn read_int_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<i32, SerialError> {
        let _ = (desc, index);
        self.read_int_value()
    }

    fn read_long_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<i64, SerialError> {
        let _ = (desc, index);
        self.read_long_value()
    }

    fn read_float_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<f32, SerialError> {
        let _ = (desc, index);
        self.read_float_value()
    }

    fn read_double_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<f64, SerialError> {
        let _ = (desc, index);
        self.read_double_value()
    }

    fn read_char_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<char, SerialError> {
        let _ = (desc, index);
        self.read_char_value()
    }

    fn read_string_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<alloc::string::String, SerialError> {
        let _ = (desc, index);
        self.read_string_value()
    }

    // ------------------------------------------------------------------ recursive

    /// Reads a nested serializable value.
    ///
    /// By default a boxed [`Value`] tree is read and unboxed through a
    /// [`ValueInput`]. Override with `loader.load(self)` for structural
    /// recursion on the same session.
    fn read_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<T, SerialError> {
        match self.read_nullable_value()? {
            Some(boxed) => ValueInput::decode(boxed, loader),
            None => Err(SerialError::UnexpectedNull {
                expected: alloc::string::String::from("serializable value"),
            }),
        }
    }

    /// Reads a serializable value that may be null.
    ///
    /// Backends that override [`read_serializable_value`](Input::read_serializable_value)
    /// with `loader.load(self)` override this with `loader.load_nullable(self)`,
    /// which also accepts a `false` [`read_begin`](Input::read_begin) as null.
    fn read_nullable_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<Option<T>, SerialError> {
        if self.read_not_null_mark()? {
            self.read_serializable_value(loader).map(Some)
        } else {
            self.read_null_value()?;
            Ok(None)
        }
    }

    fn read_serializable_element_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        loader: &L,
    ) -> Result<T, SerialError> {
        let _ = (desc, index);
        self.read_serializable_value(loader)
    }

    fn read_nullable_serializable_element_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        loader: &L,
    ) -> Result<Option<T>, SerialError> {
        let _ = (desc, index);
        self.read_nullable_serializable_value(loader)
    }
}
