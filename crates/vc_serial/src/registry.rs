//! Runtime lookup of serializers by type or serial name.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::desc::{ClassDesc, Described};
use crate::hash::{HashMap, HashSet};
use crate::value::{Value, ValueKind};
use crate::{Serializable, SerialError, ValueInput, ValueOutput};

// -----------------------------------------------------------------------------
// Registration

/// A type-erased serializer entry.
///
/// Values cross the erased boundary as boxed [`Value`] trees.
#[derive(Clone, Copy)]
pub struct Registration {
    type_id: TypeId,
    type_path: &'static str,
    desc: &'static dyn ClassDesc,
    encode: fn(&dyn Any) -> Result<Value, SerialError>,
    decode: fn(Value) -> Result<Box<dyn Any>, SerialError>,
}

impl Registration {
    /// Creates the entry of `T`.
    pub fn of<T: Serializable + Described + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: core::any::type_name::<T>(),
            desc: T::descriptor(),
            encode: encode_erased::<T>,
            decode: decode_erased::<T>,
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type path, as given by [`core::any::type_name`].
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn descriptor(&self) -> &'static dyn ClassDesc {
        self.desc
    }

    /// Boxes `value`, which must be of the registered type.
    pub fn encode(&self, value: &dyn Any) -> Result<Value, SerialError> {
        (self.encode)(value)
    }

    /// Loads a value of the registered type from a boxed tree.
    pub fn decode(&self, value: Value) -> Result<Box<dyn Any>, SerialError> {
        (self.decode)(value)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("type_path", &self.type_path)
            .field("desc", &self.desc)
            .finish()
    }
}

fn encode_erased<T: Serializable + 'static>(value: &dyn Any) -> Result<Value, SerialError> {
    match value.downcast_ref::<T>() {
        Some(value) => ValueOutput::encode(&T::serializer(), value),
        None => Err(SerialError::custom(format_args!(
            "value is not a `{}`",
            core::any::type_name::<T>()
        ))),
    }
}

fn decode_erased<T: Serializable + 'static>(value: Value) -> Result<Box<dyn Any>, SerialError> {
    let value: T = ValueInput::decode(value, &T::serializer())?;
    Ok(Box::new(value))
}

// -----------------------------------------------------------------------------
// SerialRegistry

/// A registry of serializable types.
///
/// Types are keyed by [`TypeId`], by type path and by serial name. When two
/// types share a serial name, the name becomes ambiguous and is no longer
/// resolvable; both types stay reachable by id and type path.
///
/// # Examples
///
/// ```
/// use vc_serial::{serializable, Serializable, ValueOutput};
/// use vc_serial::registry::SerialRegistry;
///
/// serializable! {
///     #[derive(Debug, PartialEq)]
///     struct Point {
///         x: i32,
///         y: i32,
///     }
/// }
///
/// let mut registry = SerialRegistry::new();
/// assert!(registry.register::<Point>());
/// assert!(!registry.register::<Point>());
///
/// let value = ValueOutput::encode(&Point::serializer(), &Point { x: 1, y: 2 }).unwrap();
/// let any = registry.decode(value).unwrap();
/// assert_eq!(any.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
/// ```
#[derive(Default)]
pub struct SerialRegistry {
    registrations: HashMap<TypeId, Registration>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    serial_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
}

impl SerialRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` if it was not registered yet.
    ///
    /// Returns `false` if `T` was already present.
    pub fn register<T: Serializable + Described + 'static>(&mut self) -> bool {
        self.insert(Registration::of::<T>())
    }

    /// Adds `registration` if its type was not registered yet.
    pub fn insert(&mut self, registration: Registration) -> bool {
        if self.registrations.contains_key(&registration.type_id) {
            return false;
        }

        let desc = registration.desc;
        let name: &'static str = desc.name();
        if !self.ambiguous_names.contains(name) {
            if self.serial_name_to_id.remove(name).is_some() {
                log::warn!(
                    "serial name `{name}` is shared by several types and can no longer be looked up by name"
                );
                self.ambiguous_names.insert(name);
            } else {
                self.serial_name_to_id.insert(name, registration.type_id);
            }
        }

        self.type_path_to_id
            .insert(registration.type_path, registration.type_id);
        self.registrations
            .insert(registration.type_id, registration);
        true
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.registrations.contains_key(&type_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&Registration> {
        self.registrations.get(&type_id)
    }

    #[inline]
    pub fn get_of<T: 'static>(&self) -> Option<&Registration> {
        self.get(TypeId::of::<T>())
    }

    pub fn get_with_type_path(&self, type_path: &str) -> Option<&Registration> {
        self.type_path_to_id
            .get(type_path)
            .and_then(|id| self.get(*id))
    }

    /// Returns the registration owning `name`, `None` if unknown or ambiguous.
    pub fn get_with_serial_name(&self, name: &str) -> Option<&Registration> {
        self.serial_name_to_id
            .get(name)
            .and_then(|id| self.get(*id))
    }

    /// Returns `true` if `name` is used by more than one registered type.
    #[inline]
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.ambiguous_names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.values()
    }

    /// Loads a boxed record through the registration owning its class name.
    pub fn decode(&self, value: Value) -> Result<Box<dyn Any>, SerialError> {
        let record = match value {
            Value::Record(record) => record,
            other => {
                return Err(SerialError::TypeMismatch {
                    expected: ValueKind::Record,
                    found: other.kind(),
                });
            }
        };
        let Some(registration) = self.get_with_serial_name(record.class()) else {
            let reason = if self.is_ambiguous(record.class()) {
                "is ambiguous"
            } else {
                "is not registered"
            };
            return Err(SerialError::custom(format_args!(
                "serial name `{}` {reason}",
                record.class()
            )));
        };
        registration.decode(Value::Record(record))
    }
}
