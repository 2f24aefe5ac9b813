//! Serializers for scalars, strings, `Option<T>` and `Vec<T>`.
//!
//! Scalars and strings use the typed calls, so as elements of a record they
//! reach the backend through the fused `write_xxx_element_value` family
//! instead of a nested serializable.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::codec;
use crate::desc::{ArrayDesc, ClassDesc};
use crate::error::ProtocolViolation;
use crate::hash::HashSet;
use crate::input::Input;
use crate::output::Output;
use crate::serializer::{Loader, Saver};
use crate::{Serializable, SerialError};

// -----------------------------------------------------------------------------
// Scalars

macro_rules! impl_scalar_serializer {
    ($(
        $(#[$meta:meta])*
        $ty:ty => $serializer:ident {
            $write:ident, $read:ident, $write_element:ident, $read_element:ident
        }
    )*) => {$(
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $serializer;

        impl Saver<$ty> for $serializer {
            #[inline]
            fn save<O: Output + ?Sized>(&self, output: &mut O, value: &$ty) -> Result<(), SerialError> {
                output.$write(*value)
            }
        }

        impl Loader<$ty> for $serializer {
            #[inline]
            fn load<I: Input + ?Sized>(&self, input: &mut I) -> Result<$ty, SerialError> {
                input.$read()
            }
        }

        impl Serializable for $ty {
            type Serializer = $serializer;

            #[inline]
            fn serializer() -> Self::Serializer {
                $serializer
            }

            #[inline]
            fn save_element<O: Output + ?Sized>(
                output: &mut O,
                desc: &'static dyn ClassDesc,
                index: usize,
                value: &Self,
            ) -> Result<(), SerialError> {
                output.$write_element(desc, index, *value)
            }

            #[inline]
            fn load_element<I: Input + ?Sized>(
                input: &mut I,
                desc: &'static dyn ClassDesc,
                index: usize,
            ) -> Result<Self, SerialError> {
                input.$read_element(desc, index)
            }
        }
    )*};
}

impl_scalar_serializer! {
    bool => BoolSerializer {
        write_bool_value, read_bool_value, write_bool_element_value, read_bool_element_value
    }
    /// Serializer of the 8-bit `byte` kind.
    i8 => ByteSerializer {
        write_byte_value, read_byte_value, write_byte_element_value, read_byte_element_value
    }
    /// Serializer of the 16-bit `short` kind.
    i16 => ShortSerializer {
        write_short_value, read_short_value, write_short_element_value, read_short_element_value
    }
    i32 => IntSerializer {
        write_int_value, read_int_value, write_int_element_value, read_int_element_value
    }
    /// Serializer of the 64-bit `long` kind.
    i64 => LongSerializer {
        write_long_value, read_long_value, write_long_element_value, read_long_element_value
    }
    f32 => FloatSerializer {
        write_float_value, read_float_value, write_float_element_value, read_float_element_value
    }
    f64 => DoubleSerializer {
        write_double_value, read_double_value, write_double_element_value, read_double_element_value
    }
    char => CharSerializer {
        write_char_value, read_char_value, write_char_element_value, read_char_element_value
    }
}

// -----------------------------------------------------------------------------
// String

/// Serializer of UTF-8 strings; saves both `String` and `str`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StringSerializer;

impl Saver<str> for StringSerializer {
    #[inline]
    fn save<O: Output + ?Sized>(&self, output: &mut O, value: &str) -> Result<(), SerialError> {
        output.write_string_value(value)
    }
}

impl Saver<String> for StringSerializer {
    #[inline]
    fn save<O: Output + ?Sized>(&self, output: &mut O, value: &String) -> Result<(), SerialError> {
        output.write_string_value(value)
    }
}

impl Loader<String> for StringSerializer {
    #[inline]
    fn load<I: Input + ?Sized>(&self, input: &mut I) -> Result<String, SerialError> {
        input.read_string_value()
    }
}

impl Serializable for String {
    type Serializer = StringSerializer;

    #[inline]
    fn serializer() -> Self::Serializer {
        StringSerializer
    }

    #[inline]
    fn save_element<O: Output + ?Sized>(
        output: &mut O,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: &Self,
    ) -> Result<(), SerialError> {
        output.write_string_element_value(desc, index, value)
    }

    #[inline]
    fn load_element<I: Input + ?Sized>(
        input: &mut I,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<Self, SerialError> {
        input.read_string_element_value(desc, index)
    }
}

// -----------------------------------------------------------------------------
// Option

/// Wraps a serializer to accept null.
///
/// Null is written with [`Output::write_null_value`]; a present value is
/// announced with [`Output::write_not_null_mark`] and then saved by the
/// inner serializer. Loading goes through [`Loader::load_nullable`] of the
/// inner serializer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NullableSerializer<S>(pub S);

impl<T, S: Saver<T>> Saver<Option<T>> for NullableSerializer<S> {
    fn save<O: Output + ?Sized>(&self, output: &mut O, value: &Option<T>) -> Result<(), SerialError> {
        match value {
            None => output.write_null_value(),
            Some(value) => {
                output.write_not_null_mark()?;
                self.0.save(output, value)
            }
        }
    }
}

impl<T, S: Loader<T>> Loader<Option<T>> for NullableSerializer<S> {
    #[inline]
    fn load<I: Input + ?Sized>(&self, input: &mut I) -> Result<Option<T>, SerialError> {
        self.0.load_nullable(input)
    }
}

impl<T: Serializable> Serializable for Option<T> {
    type Serializer = NullableSerializer<T::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        NullableSerializer(T::serializer())
    }

    fn save_element<O: Output + ?Sized>(
        output: &mut O,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: &Self,
    ) -> Result<(), SerialError> {
        output.write_nullable_serializable_element_value(desc, index, &T::serializer(), value.as_ref())
    }

    fn load_element<I: Input + ?Sized>(
        input: &mut I,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<Self, SerialError> {
        input.read_nullable_serializable_element_value(desc, index, &T::serializer())
    }
}

// -----------------------------------------------------------------------------
// Vec

/// The descriptor of every list.
pub static LIST_DESC: ArrayDesc = ArrayDesc::new("List");

/// Serializer of `Vec<T>` as a variable-arity record described by [`LIST_DESC`].
///
/// The length is announced with [`Output::write_size`]. When loading,
/// keyed inputs may deliver items in any order, but the delivered indices
/// must cover `0..N` exactly; an index at or past the item count is an
/// [`IndexOutOfRange`](ProtocolViolation::IndexOutOfRange) error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListSerializer<S>(pub S);

impl<T, S: Saver<T>> Saver<Vec<T>> for ListSerializer<S> {
    fn save<O: Output + ?Sized>(&self, output: &mut O, value: &Vec<T>) -> Result<(), SerialError> {
        output.write_begin(&LIST_DESC)?;
        output.write_size(&LIST_DESC, value.len())?;
        for (index, item) in value.iter().enumerate() {
            output.write_serializable_element_value(&LIST_DESC, index, &self.0, item)?;
        }
        output.write_end(&LIST_DESC)
    }
}

impl<T, S: Loader<T>> Loader<Vec<T>> for ListSerializer<S> {
    fn load<I: Input + ?Sized>(&self, input: &mut I) -> Result<Vec<T>, SerialError> {
        if !input.read_begin(&LIST_DESC)? {
            return Err(SerialError::UnexpectedNull {
                expected: LIST_DESC.name().to_string(),
            });
        }
        self.load_items(input)
    }

    fn load_nullable<I: Input + ?Sized>(
        &self,
        input: &mut I,
    ) -> Result<Option<Vec<T>>, SerialError> {
        if !input.read_not_null_mark()? {
            input.read_null_value()?;
            return Ok(None);
        }
        if !input.read_begin(&LIST_DESC)? {
            return Ok(None);
        }
        self.load_items(input).map(Some)
    }
}

impl<S> ListSerializer<S> {
    /// Reads the items of an opened list and its `read_end`.
    ///
    /// Items are kept sparse until the input is exhausted, so the memory
    /// used is bounded by what the input actually delivered.
    fn load_items<T, I>(&self, input: &mut I) -> Result<Vec<T>, SerialError>
    where
        S: Loader<T>,
        I: Input + ?Sized,
    {
        let mut seen: HashSet<usize> = HashSet::default();
        let mut items: Vec<(usize, T)> = Vec::new();
        codec::read_elements(input, &LIST_DESC, |input, index| {
            if !seen.insert(index) {
                return Err(ProtocolViolation::DuplicateElement {
                    class: LIST_DESC.name().to_string(),
                    index,
                }
                .into());
            }
            let item = input.read_serializable_element_value(&LIST_DESC, index, &self.0)?;
            items.push((index, item));
            Ok(())
        })?;
        input.read_end(&LIST_DESC)?;

        // Indices are distinct, so any index past the item count leaves a gap.
        items.sort_by_key(|(index, _)| *index);
        let count = items.len();
        if let Some(&(index, _)) = items.last()
            && index >= count
        {
            return Err(ProtocolViolation::IndexOutOfRange {
                class: LIST_DESC.name().to_string(),
                index,
                count,
            }
            .into());
        }
        Ok(items.into_iter().map(|(_, item)| item).collect())
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    type Serializer = ListSerializer<T::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        ListSerializer(T::serializer())
    }
}
