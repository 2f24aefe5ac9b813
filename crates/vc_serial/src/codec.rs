//! The calling convention shared by every struct codec.
//!
//! A codec for a record type `T` is a [`Codec`] impl plus a [`CodecSerializer<T>`]:
//!
//! - save: [`write_begin`], one fused element write per element in
//!   declaration order, [`write_end`].
//! - load: [`read_begin`], the [`read_elements`] loop with one [`Slot`] per
//!   element, [`read_end`], then construction from the filled slots.
//!
//! [`serializable!`](crate::serializable) generates all of it from a struct
//! definition. Hand-written codecs follow the same shape.
//!
//! [`write_begin`]: crate::Output::write_begin
//! [`write_end`]: crate::Output::write_end
//! [`read_begin`]: crate::Input::read_begin
//! [`read_end`]: crate::Input::read_end

use alloc::string::{String, ToString};
use core::fmt;
use core::marker::PhantomData;

use crate::desc::{ClassDesc, Described};
use crate::error::ProtocolViolation;
use crate::input::{ElementRead, Input};
use crate::output::Output;
use crate::serializer::{Loader, Saver};
use crate::SerialError;

// -----------------------------------------------------------------------------
// Codec

/// The element-level half of a record codec.
///
/// [`CodecSerializer`] wraps these with the begin and end delimiters.
pub trait Codec: Described + Sized {
    /// Writes every element in declaration order.
    fn save_elements<O: Output + ?Sized>(&self, output: &mut O) -> Result<(), SerialError>;

    /// Reads elements in whatever order the input delivers them.
    fn load_elements<I: Input + ?Sized>(input: &mut I) -> Result<Self, SerialError>;
}

/// The [`Serializer`](crate::Serializer) of a [`Codec`] type.
pub struct CodecSerializer<T>(PhantomData<fn() -> T>);

impl<T> CodecSerializer<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CodecSerializer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CodecSerializer<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CodecSerializer<T> {}

impl<T> fmt::Debug for CodecSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CodecSerializer")
            .field(&core::any::type_name::<T>())
            .finish()
    }
}

impl<T: Codec> Saver<T> for CodecSerializer<T> {
    fn save<O: Output + ?Sized>(&self, output: &mut O, value: &T) -> Result<(), SerialError> {
        let desc = T::descriptor();
        output.write_begin(desc)?;
        value.save_elements(output)?;
        output.write_end(desc)
    }
}

impl<T: Codec> Loader<T> for CodecSerializer<T> {
    fn load<I: Input + ?Sized>(&self, input: &mut I) -> Result<T, SerialError> {
        let desc = T::descriptor();
        if !input.read_begin(desc)? {
            return Err(SerialError::UnexpectedNull {
                expected: desc.name().to_string(),
            });
        }
        load_record(input, desc)
    }

    /// Accepts both a null mark and a `false` answer of `read_begin` as null.
    fn load_nullable<I: Input + ?Sized>(&self, input: &mut I) -> Result<Option<T>, SerialError> {
        if !input.read_not_null_mark()? {
            input.read_null_value()?;
            return Ok(None);
        }
        let desc = T::descriptor();
        if !input.read_begin(desc)? {
            return Ok(None);
        }
        load_record(input, desc).map(Some)
    }
}

fn load_record<T: Codec, I: Input + ?Sized>(
    input: &mut I,
    desc: &'static dyn ClassDesc,
) -> Result<T, SerialError> {
    let value = T::load_elements(input)?;
    input.read_end(desc)?;
    Ok(value)
}

// -----------------------------------------------------------------------------
// Unordered read loop

/// Drives [`Input::read_element`] until the input is exhausted.
///
/// `read` is called once per delivered index:
///
/// - [`ElementRead::All`]: indices `0..N` in order, then the loop ends.
///   For array descriptors `N` comes from [`Input::read_size`].
/// - [`ElementRead::Index`]: that index, after a bounds check against
///   fixed-shape descriptors.
/// - [`ElementRead::Done`]: the loop ends.
pub fn read_elements<I, F>(
    input: &mut I,
    desc: &'static dyn ClassDesc,
    mut read: F,
) -> Result<(), SerialError>
where
    I: Input + ?Sized,
    F: FnMut(&mut I, usize) -> Result<(), SerialError>,
{
    loop {
        match input.read_element(desc)? {
            ElementRead::All => {
                let len = if desc.is_array() {
                    match input.read_size(desc)? {
                        Some(len) => Some(len),
                        None => return Err(SerialError::unsupported("read_size")),
                    }
                } else {
                    None
                };
                for index in 0..desc.element_count(len) {
                    read(input, index)?;
                }
                return Ok(());
            }
            ElementRead::Index(index) => {
                let count = desc.element_count(None);
                if !desc.is_array() && index >= count {
                    return Err(ProtocolViolation::IndexOutOfRange {
                        class: desc.name().to_string(),
                        index,
                        count,
                    }
                    .into());
                }
                read(input, index)?;
            }
            ElementRead::Done => return Ok(()),
        }
    }
}

// -----------------------------------------------------------------------------
// Slot

/// A decode-time local for one element.
///
/// Filling twice is a [`DuplicateElement`](ProtocolViolation::DuplicateElement)
/// error; taking an empty slot is a [`MissingElement`](SerialError::MissingElement)
/// error unless a default is supplied.
pub struct Slot<T>(Option<T>);

impl<T> Slot<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(None)
    }

    #[inline]
    pub const fn is_filled(&self) -> bool {
        self.0.is_some()
    }

    /// Fills the slot with the value produced by `read`.
    ///
    /// The duplicate check runs before `read`, so nothing is consumed
    /// from the input for a duplicate index.
    pub fn fill_with(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        read: impl FnOnce() -> Result<T, SerialError>,
    ) -> Result<(), SerialError> {
        if self.0.is_some() {
            return Err(ProtocolViolation::DuplicateElement {
                class: desc.name().to_string(),
                index,
            }
            .into());
        }
        self.0 = Some(read()?);
        Ok(())
    }

    /// Returns the value, or a `MissingElement` error naming element `index`.
    pub fn take(self, desc: &'static dyn ClassDesc, index: usize) -> Result<T, SerialError> {
        self.0.ok_or_else(|| SerialError::MissingElement {
            class: desc.name().to_string(),
            element: element_label(desc, index),
        })
    }

    #[inline]
    pub fn take_or_else(self, default: impl FnOnce() -> T) -> T {
        self.0.unwrap_or_else(default)
    }
}

impl<T> Default for Slot<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn element_label(desc: &dyn ClassDesc, index: usize) -> String {
    match desc.element_name(index) {
        Some(name) => name.into_owned(),
        None => index.to_string(),
    }
}

// -----------------------------------------------------------------------------
// serializable!

/// Defines a struct together with its [`ClassDesc`], [`Codec`] and
/// [`Serializable`](crate::Serializable) impls.
///
/// Elements are the fields in declaration order. A field with `= expr`
/// falls back to that expression when the input never delivers it; other
/// fields are required. `as "Name"` overrides the serial name.
///
/// # Examples
///
/// ```
/// use vc_serial::{serializable, Serializable, Value, ValueInput, ValueOutput};
/// use vc_serial::value::Record;
///
/// serializable! {
///     #[derive(Debug, PartialEq)]
///     pub struct Point as "geo.Point" {
///         pub x: i32,
///         pub y: i32 = -1,
///     }
/// }
///
/// let point = Point { x: 3, y: 4 };
/// let value = ValueOutput::encode(&Point::serializer(), &point).unwrap();
/// assert_eq!(value.as_record().unwrap().class(), "geo.Point");
///
/// let partial = Value::Record(Record::new("geo.Point").with("x", 3_i32));
/// let loaded = ValueInput::decode(partial, &Point::serializer()).unwrap();
/// assert_eq!(loaded, Point { x: 3, y: -1 });
/// ```
#[macro_export]
macro_rules! serializable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(as $serial:literal)? {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        const _: () = {
            #[allow(non_camel_case_types, dead_code)]
            enum __Element {
                $($field,)*
            }

            static DESC: $crate::desc::StructDesc = $crate::desc::StructDesc::new(
                $crate::__serial_name!($name $(, $serial)?),
                &[$(::core::stringify!($field)),*],
            );

            impl $crate::desc::Described for $name {
                #[inline]
                fn descriptor() -> &'static dyn $crate::desc::ClassDesc {
                    &DESC
                }
            }

            impl $crate::codec::Codec for $name {
                fn save_elements<O: $crate::Output + ?Sized>(
                    &self,
                    output: &mut O,
                ) -> ::core::result::Result<(), $crate::SerialError> {
                    $(
                        <$ty as $crate::Serializable>::save_element(
                            output,
                            &DESC,
                            __Element::$field as usize,
                            &self.$field,
                        )?;
                    )*
                    let _ = output;
                    ::core::result::Result::Ok(())
                }

                #[allow(unused_variables)]
                fn load_elements<I: $crate::Input + ?Sized>(
                    input: &mut I,
                ) -> ::core::result::Result<Self, $crate::SerialError> {
                    $(
                        let mut $field = $crate::codec::Slot::<$ty>::new();
                    )*
                    $crate::codec::read_elements(input, &DESC, |input, index| {
                        $(
                            if index == __Element::$field as usize {
                                return $field.fill_with(&DESC, index, || {
                                    <$ty as $crate::Serializable>::load_element(input, &DESC, index)
                                });
                            }
                        )*
                        ::core::result::Result::Ok(())
                    })?;
                    ::core::result::Result::Ok(Self {
                        $(
                            $field: $crate::__take_slot!(
                                $field, &DESC, __Element::$field as usize $(, $default)?
                            ),
                        )*
                    })
                }
            }

            impl $crate::Serializable for $name {
                type Serializer = $crate::codec::CodecSerializer<Self>;

                #[inline]
                fn serializer() -> Self::Serializer {
                    $crate::codec::CodecSerializer::new()
                }
            }
        };
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __serial_name {
    ($name:ident) => {
        ::core::stringify!($name)
    };
    ($name:ident, $serial:literal) => {
        $serial
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __take_slot {
    ($slot:ident, $desc:expr, $index:expr) => {
        $slot.take($desc, $index)?
    };
    ($slot:ident, $desc:expr, $index:expr, $default:expr) => {
        $slot.take_or_else(|| $default)
    };
}
