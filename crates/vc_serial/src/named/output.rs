use crate::desc::ClassDesc;
use crate::named::{resolve_name, take_name, Cursor};
use crate::output::Output;
use crate::serializer::Saver;
use crate::value::{Value, ValueOutput};
use crate::SerialError;

// -----------------------------------------------------------------------------
// NamedOutput

/// A backend that stores values under element names.
///
/// Only [`write_named`](NamedOutput::write_named) and
/// [`write_named_null`](NamedOutput::write_named_null) need an
/// implementation; the typed rows box their argument and delegate.
pub trait NamedOutput {
    fn write_named(&mut self, name: &str, value: Value) -> Result<(), SerialError> {
        let _ = (name, value);
        Err(SerialError::unsupported("write_named"))
    }

    fn write_named_null(&mut self, name: &str) -> Result<(), SerialError> {
        let _ = name;
        Err(SerialError::unsupported("write_named_null"))
    }

    fn write_named_nullable(&mut self, name: &str, value: Option<Value>) -> Result<(), SerialError> {
        match value {
            None => self.write_named_null(name),
            Some(value) => self.write_named(name, value),
        }
    }

    fn write_named_bool(&mut self, name: &str, value: bool) -> Result<(), SerialError> {
        self.write_named(name, Value::Bool(value))
    }

    fn write_named_byte(&mut self, name: &str, value: i8) -> Result<(), SerialError> {
        self.write_named(name, Value::Byte(value))
    }

    fn write_named_short(&mut self, name: &str, value: i16) -> Result<(), SerialError> {
        self.write_named(name, Value::Short(value))
    }

    fn write_named_int(&mut self, name: &str, value: i32) -> Result<(), SerialError> {
        self.write_named(name, Value::Int(value))
    }

    fn write_named_long(&mut self, name: &str, value: i64) -> Result<(), SerialError> {
        self.write_named(name, Value::Long(value))
    }

    fn write_named_float(&mut self, name: &str, value: f32) -> Result<(), SerialError> {
        self.write_named(name, Value::Float(value))
    }

    fn write_named_double(&mut self, name: &str, value: f64) -> Result<(), SerialError> {
        self.write_named(name, Value::Double(value))
    }

    fn write_named_char(&mut self, name: &str, value: char) -> Result<(), SerialError> {
        self.write_named(name, Value::Char(value))
    }

    fn write_named_string(&mut self, name: &str, value: &str) -> Result<(), SerialError> {
        self.write_named(name, Value::from(value))
    }

    /// Stores a nested serializable, boxed into a [`Value`] tree by default.
    fn write_named_serializable<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        name: &str,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        let boxed = ValueOutput::encode(saver, value)?;
        self.write_named(name, boxed)
    }

    fn write_named_nullable_serializable<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        name: &str,
        saver: &S,
        value: Option<&T>,
    ) -> Result<(), SerialError> {
        match value {
            None => self.write_named_null(name),
            Some(value) => self.write_named_serializable(name, saver, value),
        }
    }
}

// -----------------------------------------------------------------------------
// NamedValueOutput

/// Adapts a [`NamedOutput`] to the [`Output`] protocol.
///
/// # Examples
///
/// ```
/// use vc_serial::Output;
/// use vc_serial::desc::StructDesc;
/// use vc_serial::named::{PropertyMap, PropertyMapOutput};
///
/// static POINT: StructDesc = StructDesc::new("Point", &["x", "y"]);
///
/// let mut output = PropertyMapOutput::new(PropertyMap::new());
/// output.write_begin(&POINT).unwrap();
/// output.write_int_element_value(&POINT, 0, 3).unwrap();
/// output.write_element(&POINT, 1).unwrap();
/// output.write_int_value(4).unwrap();
/// output.write_end(&POINT).unwrap();
///
/// let map = output.into_inner();
/// assert_eq!(map.len(), 2);
/// ```
pub struct NamedValueOutput<B> {
    backend: B,
    last: Cursor,
}

impl<B> NamedValueOutput<B> {
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

macro_rules! forward_typed_writes {
    ($($ty:ty => $unfused:ident, $fused:ident, $named:ident;)*) => {$(
        fn $unfused(&mut self, value: $ty) -> Result<(), SerialError> {
            let name = take_name(&mut self.last)?;
            self.backend.$named(&name, value)
        }

        fn $fused(
            &mut self,
            desc: &'static dyn ClassDesc,
            index: usize,
            value: $ty,
        ) -> Result<(), SerialError> {
            let name = resolve_name(desc, index)?;
            self.backend.$named(&name, value)
        }
    )*};
}

impl<B: NamedOutput> Output for NamedValueOutput<B> {
    fn write_element(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<(), SerialError> {
        self.last = Some((desc, index));
        Ok(())
    }

    fn write_null_value(&mut self) -> Result<(), SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.write_named_null(&name)
    }

    fn write_value(&mut self, value: Value) -> Result<(), SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.write_named(&name, value)
    }

    fn write_nullable_value(&mut self, value: Option<Value>) -> Result<(), SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.write_named_nullable(&name, value)
    }

    forward_typed_writes! {
        bool => write_bool_value, write_bool_element_value, write_named_bool;
        i8 => write_byte_value, write_byte_element_value, write_named_byte;
        i16 => write_short_value, write_short_element_value, write_named_short;
        i32 => write_int_value, write_int_element_value, write_named_int;
        i64 => write_long_value, write_long_element_value, write_named_long;
        f32 => write_float_value, write_float_element_value, write_named_float;
        f64 => write_double_value, write_double_element_value, write_named_double;
        char => write_char_value, write_char_element_value, write_named_char;
        &str => write_string_value, write_string_element_value, write_named_string;
    }

    fn write_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: Value,
    ) -> Result<(), SerialError> {
        let name = resolve_name(desc, index)?;
        self.backend.write_named(&name, value)
    }

    fn write_nullable_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: Option<Value>,
    ) -> Result<(), SerialError> {
        let name = resolve_name(desc, index)?;
        self.backend.write_named_nullable(&name, value)
    }

    fn write_serializable_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.write_named_serializable(&name, saver, value)
    }

    fn write_nullable_serializable_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        saver: &S,
        value: Option<&T>,
    ) -> Result<(), SerialError> {
        let name = take_name(&mut self.last)?;
        self.backend.write_named_nullable_serializable(&name, saver, value)
    }

    fn write_serializable_element_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        let name = resolve_name(desc, index)?;
        self.backend.write_named_serializable(&name, saver, value)
    }

    fn write_nullable_serializable_element_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        saver: &S,
        value: Option<&T>,
    ) -> Result<(), SerialError> {
        let name = resolve_name(desc, index)?;
        self.backend.write_named_nullable_serializable(&name, saver, value)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{NamedOutput, NamedValueOutput};
    use crate::desc::StructDesc;
    use crate::error::ProtocolViolation;
    use crate::output::Output;
    use crate::value::Value;
    use crate::SerialError;

    static PAIR: StructDesc = StructDesc::new("Pair", &["first", "second"]);

    #[derive(Default)]
    struct Log(Vec<(&'static str, Value)>);

    impl NamedOutput for Log {
        fn write_named(&mut self, name: &str, value: Value) -> Result<(), SerialError> {
            let name = PAIR.elements().iter().find(|n| **n == name).copied();
            self.0.push((name.unwrap_or("?"), value));
            Ok(())
        }
    }

    #[test]
    fn cursor_is_consumed_once() {
        let mut output = NamedValueOutput::new(Log::default());
        output.write_element(&PAIR, 1).unwrap();
        output.write_long_value(5).unwrap();
        assert_eq!(
            output.write_long_value(6),
            Err(SerialError::Protocol(ProtocolViolation::NoElementAddressed))
        );
        output.write_string_element_value(&PAIR, 0, "a").unwrap();
        assert_eq!(
            output.into_inner().0,
            [("second", Value::Long(5)), ("first", Value::from("a"))]
        );
    }

    #[test]
    fn null_needs_backend_support() {
        let mut output = NamedValueOutput::new(Log::default());
        assert_eq!(
            output.write_nullable_element_value(&PAIR, 0, None),
            Err(SerialError::Unsupported {
                operation: "write_named_null"
            })
        );
        assert!(matches!(
            output.write_int_element_value(&PAIR, 2, 0),
            Err(SerialError::Protocol(ProtocolViolation::IndexOutOfRange { .. }))
        ));
    }
}
