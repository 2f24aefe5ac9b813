use crate::desc::ClassDesc;
use crate::{Input, Output, SerialError};

// -----------------------------------------------------------------------------
// Saver / Loader

/// The write half of a [`Serializer`].
///
/// A saver only talks to the [`Output`] protocol, so the same saver runs
/// against every backend.
pub trait Saver<T: ?Sized> {
    fn save<O: Output + ?Sized>(&self, output: &mut O, value: &T) -> Result<(), SerialError>;
}

/// The read half of a [`Serializer`].
pub trait Loader<T> {
    fn load<I: Input + ?Sized>(&self, input: &mut I) -> Result<T, SerialError>;

    /// Loads a value that may be null.
    ///
    /// The default asks [`Input::read_not_null_mark`] first. Loaders of
    /// delimited values also accept a `false` answer from
    /// [`Input::read_begin`] as an inline null.
    fn load_nullable<I: Input + ?Sized>(&self, input: &mut I) -> Result<Option<T>, SerialError> {
        if input.read_not_null_mark()? {
            self.load(input).map(Some)
        } else {
            input.read_null_value()?;
            Ok(None)
        }
    }
}

/// A [`Saver`] and [`Loader`] pair for the same type.
///
/// Implemented automatically for every type providing both halves.
pub trait Serializer<T>: Saver<T> + Loader<T> {}

impl<T, S: Saver<T> + Loader<T> + ?Sized> Serializer<T> for S {}

// -----------------------------------------------------------------------------
// Serializable

/// A type with a default [`Serializer`].
///
/// The element hooks decide which protocol call a codec emits when a value
/// of this type is an element of an enclosing record. The defaults treat the
/// value as a nested serializable; scalar types override them with the typed
/// element calls and `Option<T>` with the nullable ones.
///
/// # Examples
///
/// ```
/// use vc_serial::{Serializable, ValueInput, ValueOutput, Value};
///
/// let value = ValueOutput::encode(&i32::serializer(), &42).unwrap();
/// assert_eq!(value, Value::Int(42));
///
/// let back: i32 = ValueInput::decode(value, &i32::serializer()).unwrap();
/// assert_eq!(back, 42);
/// ```
pub trait Serializable: Sized {
    type Serializer: Serializer<Self>;

    fn serializer() -> Self::Serializer;

    /// Writes `value` as element `index` of `desc`.
    fn save_element<O: Output + ?Sized>(
        output: &mut O,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: &Self,
    ) -> Result<(), SerialError> {
        output.write_serializable_element_value(desc, index, &Self::serializer(), value)
    }

    /// Reads element `index` of `desc`.
    fn load_element<I: Input + ?Sized>(
        input: &mut I,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<Self, SerialError> {
        input.read_serializable_element_value(desc, index, &Self::serializer())
    }
}
