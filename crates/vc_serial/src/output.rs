use crate::desc::ClassDesc;
use crate::serializer::Saver;
use crate::value::{Value, ValueOutput};
use crate::SerialError;

/// The writer contract.
///
/// Operations are layered: every default is expressed through a more
/// primitive operation, so a backend can override any single row and
/// stay correct.
///
/// | Layer | Operations | Default |
/// |---|---|---|
/// | Delimiters | [`write_begin`], [`write_end`] | no-op |
/// | Null | [`write_not_null_mark`] | no-op |
/// | Null | [`write_null_value`] | [`Unsupported`] |
/// | Cursor | [`write_element`] | no-op |
/// | Core | [`write_value`] | [`Unsupported`] |
/// | Typed | `write_xxx_value` | [`write_value`] with the boxed scalar |
/// | Fusion | `write_xxx_element_value` | [`write_element`] then `write_xxx_value` |
/// | Recursive | [`write_serializable_value`] | box through a [`ValueOutput`], then [`write_nullable_value`] |
///
/// A compact binary backend typically overrides the typed rows and the
/// delimiters; a dynamic backend overrides only [`write_value`]. Backends
/// that want nested formats override [`write_serializable_value`] to call
/// `saver.save(self, value)` and recurse on the same session.
///
/// Top-level saves go through [`write`](Output::write).
///
/// [`write_begin`]: Output::write_begin
/// [`write_end`]: Output::write_end
/// [`write_not_null_mark`]: Output::write_not_null_mark
/// [`write_null_value`]: Output::write_null_value
/// [`write_element`]: Output::write_element
/// [`write_value`]: Output::write_value
/// [`write_nullable_value`]: Output::write_nullable_value
/// [`write_serializable_value`]: Output::write_serializable_value
/// [`Unsupported`]: SerialError::Unsupported
pub trait Output {
    // ------------------------------------------------------------------ top-level

    /// Saves `value` with `saver`, the only entry point for external callers.
    fn write<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        saver.save(self, value)
    }

    // ------------------------------------------------------------------ delimiters

    fn write_begin(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        let _ = desc;
        Ok(())
    }

    fn write_end(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        let _ = desc;
        Ok(())
    }

    /// Announces the runtime length of a variable-arity value.
    ///
    /// Called right after [`write_begin`](Output::write_begin) for descriptors
    /// with [`is_array`](ClassDesc::is_array) set.
    fn write_size(&mut self, desc: &'static dyn ClassDesc, size: usize) -> Result<(), SerialError> {
        let _ = (desc, size);
        Ok(())
    }

    // ------------------------------------------------------------------ null handling

    fn write_not_null_mark(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    fn write_null_value(&mut self) -> Result<(), SerialError> {
        Err(SerialError::unsupported("write_null_value"))
    }

    // ------------------------------------------------------------------ cursor

    /// Records that the next value belongs to element `index` of `desc`.
    fn write_element(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<(), SerialError> {
        let _ = (desc, index);
        Ok(())
    }

    // ------------------------------------------------------------------ core value

    fn write_value(&mut self, value: Value) -> Result<(), SerialError> {
        let _ = value;
        Err(SerialError::unsupported("write_value"))
    }

    fn write_nullable_value(&mut self, value: Option<Value>) -> Result<(), SerialError> {
        match value {
            None => self.write_null_value(),
            Some(value) => {
                self.write_not_null_mark()?;
                self.write_value(value)
            }
        }
    }

    // ------------------------------------------------------------------ typed value

    fn write_bool_value(&mut self, value: bool) -> Result<(), SerialError> {
        self.write_value(Value::Bool(value))
    }

    fn write_byte_value(&mut self, value: i8) -> Result<(), SerialError> {
        self.write_value(Value::Byte(value))
    }

    fn write_short_value(&mut self, value: i16) -> Result<(), SerialError> {
        self.write_value(Value::Short(value))
    }

    fn write_int_value(&mut self, value: i32) -> Result<(), SerialError> {
        self.write_value(Value::Int(value))
    }

    fn write_long_value(&mut self, value: i64) -> Result<(), SerialError> {
        self.write_value(Value::Long(value))
    }

    fn write_float_value(&mut self, value: f32) -> Result<(), SerialError> {
        self.write_value(Value::Float(value))
    }

    fn write_double_value(&mut self, value: f64) -> Result<(), SerialError> {
        self.write_value(Value::Double(value))
    }

    fn write_char_value(&mut self, value: char) -> Result<(), SerialError> {
        self.write_value(Value::Char(value))
    }

    fn write_string_value(&mut self, value: &str) -> Result<(), SerialError> {
        self.write_value(Value::from(value))
    }

    // ------------------------------------------------------------------ element fusion

    fn write_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: Value,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_value(value)
    }

    fn write_nullable_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: Option<Value>,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_nullable_value(value)
    }

    fn write_bool_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: bool,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_bool_value(value)
    }

    fn write_byte_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: i8,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_byte_value(value)
    }

    fn write_short_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: i16,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_short_value(value)
    }

    fn write_int_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: i32,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_int_value(value)
    }

    fn write_long_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: i64,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_long_value(value)
    }

    fn write_float_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: f32,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_float_value(value)
    }

    fn write_double_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: f64,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_double_value(value)
    }

    fn write_char_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: char,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_char_value(value)
    }

    fn write_string_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: &str,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_string_value(value)
    }

    // ------------------------------------------------------------------ recursive

    /// Writes a nested serializable value.
    ///
    /// By default the value is boxed into a [`Value`] tree and written as an
    /// opaque value. Override with `saver.save(self, value)` for structural
    /// recursion on the same session.
    fn write_serializable_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        let boxed = ValueOutput::encode(saver, value)?;
        self.write_nullable_value(Some(boxed))
    }

    fn write_nullable_serializable_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        saver: &S,
        value: Option<&T>,
    ) -> Result<(), SerialError> {
        match value {
            None => self.write_null_value(),
            Some(value) => {
                self.write_not_null_mark()?;
                self.write_serializable_value(saver, value)
            }
        }
    }

    fn write_serializable_element_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_serializable_value(saver, value)
    }

    fn write_nullable_serializable_element_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        saver: &S,
        value: Option<&T>,
    ) -> Result<(), SerialError> {
        self.write_element(desc, index)?;
        self.write_nullable_serializable_value(saver, value)
    }
}
