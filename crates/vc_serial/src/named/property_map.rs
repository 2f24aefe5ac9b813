use alloc::string::{String, ToString};
use alloc::vec::{self, Vec};

use crate::desc::ClassDesc;
use crate::error::ProtocolViolation;
use crate::hash::HashMap;
use crate::named::{NamedInput, NamedOutput, NamedValueInput, NamedValueOutput};
use crate::serializer::{Loader, Saver};
use crate::value::Value;
use crate::{Input, Output, SerialError};

/// Writes a record into a [`PropertyMap`].
pub type PropertyMapOutput = NamedValueOutput<PropertyMap>;

/// Reads a record from a borrowed [`PropertyMap`].
pub type PropertyMapInput<'a> = NamedValueInput<PropertyMapReader<'a>>;

/// A flat map from element name to boxed value.
///
/// Each top-level element is one entry; nested serializables are stored
/// as a boxed [`Value`] tree.
///
/// # Examples
///
/// ```
/// use vc_serial::{serializable, Serializable, Value};
/// use vc_serial::named::PropertyMap;
///
/// serializable! {
///     #[derive(Debug, PartialEq)]
///     struct Window {
///         title: String,
///         width: i32,
///     }
/// }
///
/// let window = Window { title: "main".into(), width: 640 };
/// let mut map = PropertyMap::encode(&Window::serializer(), &window).unwrap();
/// assert_eq!(map.get("width"), Some(&Value::Int(640)));
///
/// map.insert("theme", "dark");
/// let back = map.decode(&Window::serializer()).unwrap();
/// assert_eq!(back, window);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: HashMap<String, Value>,
}

impl PropertyMap {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves `value` with `saver` into a fresh map.
    pub fn encode<T: ?Sized, S: Saver<T> + ?Sized>(
        saver: &S,
        value: &T,
    ) -> Result<Self, SerialError> {
        let mut output = PropertyMapOutput::new(Self::new());
        output.write(saver, value)?;
        Ok(output.into_inner())
    }

    /// Loads a value with `loader` from this map.
    pub fn decode<T, L: Loader<T> + ?Sized>(&self, loader: &L) -> Result<T, SerialError> {
        PropertyMapInput::new(self.reader()).read(loader)
    }

    /// Returns a [`NamedInput`] over the current entries.
    #[inline]
    pub fn reader(&self) -> PropertyMapReader<'_> {
        PropertyMapReader {
            map: self,
            pending: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Inserts an entry, returning the replaced value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl NamedOutput for PropertyMap {
    fn write_named(&mut self, name: &str, value: Value) -> Result<(), SerialError> {
        if self.entries.contains_key(name) {
            return Err(SerialError::custom(format_args!(
                "property `{name}` was written twice"
            )));
        }
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    fn write_named_null(&mut self, name: &str) -> Result<(), SerialError> {
        self.write_named(name, Value::Null)
    }
}

// -----------------------------------------------------------------------------
// PropertyMapReader

/// The [`NamedInput`] view of a [`PropertyMap`].
///
/// Names are snapshotted on the first
/// [`next_element_name`](NamedInput::next_element_name) call.
pub struct PropertyMapReader<'a> {
    map: &'a PropertyMap,
    pending: Option<vec::IntoIter<String>>,
}

impl NamedInput for PropertyMapReader<'_> {
    fn next_element_name(
        &mut self,
        desc: &'static dyn ClassDesc,
    ) -> Result<Option<String>, SerialError> {
        let map = self.map;
        let names = self.pending.get_or_insert_with(|| {
            log::trace!("reading `{}` from {} properties", desc.name(), map.len());
            map.entries.keys().cloned().collect::<Vec<_>>().into_iter()
        });
        Ok(names.next())
    }

    fn read_named(&mut self, name: &str) -> Result<Value, SerialError> {
        match self.map.get(name) {
            Some(value) => Ok(value.clone()),
            None => Err(ProtocolViolation::NoValue.into()),
        }
    }

    fn read_named_not_null(&mut self, name: &str) -> Result<bool, SerialError> {
        Ok(!self.map.get(name).is_some_and(Value::is_null))
    }
}
