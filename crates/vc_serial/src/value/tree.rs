use alloc::string::{String, ToString};
use alloc::vec::{self, Vec};

use crate::desc::ClassDesc;
use crate::error::ProtocolViolation;
use crate::input::{ElementRead, Input};
use crate::output::Output;
use crate::serializer::{Loader, Saver};
use crate::value::{Record, Value, ValueKind};
use crate::SerialError;

// -----------------------------------------------------------------------------
// ValueOutput

struct OutputFrame {
    desc: &'static dyn ClassDesc,
    record: Record,
    pending: Option<String>,
}

/// An [`Output`] that builds a [`Value`] tree.
///
/// Scalars become the matching [`Value`] variant, every
/// `write_begin`/`write_end` pair becomes a [`Record`] named after the
/// descriptor, and nested serializables recurse on the same session.
///
/// # Examples
///
/// ```
/// use vc_serial::{Serializable, Value, ValueOutput};
///
/// let value = ValueOutput::encode(&<Vec<i32>>::serializer(), &vec![1, 2]).unwrap();
/// let record = value.as_record().unwrap();
/// assert_eq!(record.class(), "List");
/// assert_eq!(record.get("1"), Some(&Value::Int(2)));
/// ```
#[derive(Default)]
pub struct ValueOutput {
    stack: Vec<OutputFrame>,
    root: Option<Value>,
}

impl ValueOutput {
    #[inline]
    pub const fn new() -> Self {
        Self {
            stack: Vec::new(),
            root: None,
        }
    }

    /// Saves `value` with `saver` into a fresh tree.
    pub fn encode<T: ?Sized, S: Saver<T> + ?Sized>(
        saver: &S,
        value: &T,
    ) -> Result<Value, SerialError> {
        let mut output = Self::new();
        output.write(saver, value)?;
        output.finish()
    }

    /// Returns the finished tree.
    ///
    /// Fails if a record is still open or nothing was written.
    pub fn finish(self) -> Result<Value, SerialError> {
        if let Some(frame) = self.stack.last() {
            return Err(ProtocolViolation::Unterminated {
                class: frame.desc.name().to_string(),
            }
            .into());
        }
        self.root.ok_or(ProtocolViolation::NoValue.into())
    }

    fn fail(&self, error: ProtocolViolation) -> SerialError {
        #[cfg(all(debug_assertions, feature = "debug"))]
        log::debug!("value output failed at {}: {error}", self.path());
        error.into()
    }

    #[cfg(all(debug_assertions, feature = "debug"))]
    fn path(&self) -> String {
        let mut path = String::from("$");
        for frame in &self.stack {
            path.push('/');
            path.push_str(frame.desc.name());
            if let Some(pending) = &frame.pending {
                path.push('.');
                path.push_str(pending);
            }
        }
        path
    }
}

impl Output for ValueOutput {
    fn write_begin(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        self.stack.push(OutputFrame {
            desc,
            record: Record::new(desc.name()),
            pending: None,
        });
        Ok(())
    }

    fn write_end(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        let error = match self.stack.pop() {
            None => ProtocolViolation::UnbalancedEnd {
                expected: None,
                found: desc.name().to_string(),
            },
            Some(frame) if frame.desc.name() != desc.name() => {
                let error = ProtocolViolation::UnbalancedEnd {
                    expected: Some(frame.desc.name().to_string()),
                    found: desc.name().to_string(),
                };
                self.stack.push(frame);
                error
            }
            Some(frame) => match &frame.pending {
                None => return self.write_value(Value::Record(frame.record)),
                Some(element) => {
                    let error = ProtocolViolation::UnfilledElement {
                        class: desc.name().to_string(),
                        element: element.clone(),
                    };
                    self.stack.push(frame);
                    error
                }
            },
        };
        Err(self.fail(error))
    }

    fn write_null_value(&mut self) -> Result<(), SerialError> {
        self.write_value(Value::Null)
    }

    fn write_element(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<(), SerialError> {
        let Some(frame) = self.stack.last() else {
            return Err(self.fail(ProtocolViolation::DescriptorMismatch {
                expected: desc.name().to_string(),
                found: String::from("nothing"),
            }));
        };
        if frame.desc.name() != desc.name() {
            let error = ProtocolViolation::DescriptorMismatch {
                expected: frame.desc.name().to_string(),
                found: desc.name().to_string(),
            };
            return Err(self.fail(error));
        }
        if let Some(element) = &frame.pending {
            let error = ProtocolViolation::UnfilledElement {
                class: desc.name().to_string(),
                element: element.clone(),
            };
            return Err(self.fail(error));
        }

        let count = desc.element_count(None);
        let name = match desc.element_name(index) {
            Some(name) if desc.is_array() || index < count => name.into_owned(),
            _ => {
                return Err(self.fail(ProtocolViolation::IndexOutOfRange {
                    class: desc.name().to_string(),
                    index,
                    count,
                }));
            }
        };
        if let Some(frame) = self.stack.last_mut() {
            frame.pending = Some(name);
        }
        Ok(())
    }

    fn write_value(&mut self, value: Value) -> Result<(), SerialError> {
        match self.stack.last_mut() {
            None => {
                if self.root.is_some() {
                    return Err(self.fail(ProtocolViolation::TrailingValue));
                }
                self.root = Some(value);
                Ok(())
            }
            Some(frame) => match frame.pending.take() {
                Some(name) => {
                    frame.record.push(name, value);
                    Ok(())
                }
                None => Err(self.fail(ProtocolViolation::NoElementAddressed)),
            },
        }
    }

    fn write_serializable_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        saver.save(self, value)
    }
}

// -----------------------------------------------------------------------------
// ValueInput

struct InputFrame {
    desc: &'static dyn ClassDesc,
    elements: vec::IntoIter<(String, Value)>,
    current: Option<Value>,
}

/// An [`Input`] that replays a [`Value`] tree.
///
/// Record elements are delivered in stored order through
/// [`read_element`](Input::read_element); names the descriptor does not
/// know are skipped.
pub struct ValueInput {
    stack: Vec<InputFrame>,
    root: Option<Value>,
}

impl ValueInput {
    #[inline]
    pub const fn new(value: Value) -> Self {
        Self {
            stack: Vec::new(),
            root: Some(value),
        }
    }

    /// Loads a value of type `T` from `value` with `loader`.
    pub fn decode<T, L: Loader<T> + ?Sized>(value: Value, loader: &L) -> Result<T, SerialError> {
        let mut input = Self::new(value);
        let result = input.read(loader)?;
        input.finish()?;
        Ok(result)
    }

    /// Checks that the tree was consumed completely.
    pub fn finish(self) -> Result<(), SerialError> {
        if let Some(frame) = self.stack.last() {
            return Err(ProtocolViolation::Unterminated {
                class: frame.desc.name().to_string(),
            }
            .into());
        }
        if self.root.is_some() {
            return Err(ProtocolViolation::TrailingValue.into());
        }
        Ok(())
    }

    #[inline]
    fn current(&mut self) -> &mut Option<Value> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.current,
            None => &mut self.root,
        }
    }

    fn take_current(&mut self) -> Result<Value, SerialError> {
        self.current().take().ok_or(ProtocolViolation::NoValue.into())
    }
}

impl Input for ValueInput {
    fn read_begin(&mut self, desc: &'static dyn ClassDesc) -> Result<bool, SerialError> {
        match self.take_current()? {
            Value::Null => Ok(false),
            Value::Record(record) => {
                if record.class() != desc.name() {
                    return Err(ProtocolViolation::DescriptorMismatch {
                        expected: desc.name().to_string(),
                        found: record.class().to_string(),
                    }
                    .into());
                }
                self.stack.push(InputFrame {
                    desc,
                    elements: record.into_elements().into_iter(),
                    current: None,
                });
                Ok(true)
            }
            other => Err(SerialError::TypeMismatch {
                expected: ValueKind::Record,
                found: other.kind(),
            }),
        }
    }

    fn read_end(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        let expected = self.stack.last().map(|frame| frame.desc.name());
        if expected != Some(desc.name()) {
            return Err(ProtocolViolation::UnbalancedEnd {
                expected: expected.map(ToString::to_string),
                found: desc.name().to_string(),
            }
            .into());
        }
        if let Some(frame) = self.stack.pop()
            && !frame.elements.as_slice().is_empty()
        {
            log::trace!(
                "{} unread elements dropped at end of `{}`",
                frame.elements.len(),
                desc.name()
            );
        }
        Ok(())
    }

    fn read_element(&mut self, desc: &'static dyn ClassDesc) -> Result<ElementRead, SerialError> {
        let Some(frame) = self.stack.last_mut() else {
            return Err(ProtocolViolation::NoValue.into());
        };
        if frame.desc.name() != desc.name() {
            return Err(ProtocolViolation::DescriptorMismatch {
                expected: frame.desc.name().to_string(),
                found: desc.name().to_string(),
            }
            .into());
        }

        for (name, value) in frame.elements.by_ref() {
            match desc.element_index(&name) {
                Some(index) => {
                    frame.current = Some(value);
                    return Ok(ElementRead::Index(index));
                }
                None => log::trace!("skipping unknown element `{name}` of `{}`", desc.name()),
            }
        }
        Ok(ElementRead::Done)
    }

    fn read_not_null_mark(&mut self) -> Result<bool, SerialError> {
        match self.current() {
            Some(value) => Ok(!value.is_null()),
            None => Err(ProtocolViolation::NoValue.into()),
        }
    }

    fn read_null_value(&mut self) -> Result<(), SerialError> {
        match self.take_current()? {
            Value::Null => Ok(()),
            other => Err(SerialError::TypeMismatch {
                expected: ValueKind::Null,
                found: other.kind(),
            }),
        }
    }

    fn read_value(&mut self) -> Result<Value, SerialError> {
        self.take_current()
    }

    fn read_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<T, SerialError> {
        loader.load(self)
    }

    fn read_nullable_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<Option<T>, SerialError> {
        loader.load_nullable(self)
    }
}
