//! Class descriptors, the compact shape metadata shared by codecs and backends.
//!
//! - [`ClassDesc`]: name, element count and bidirectional element name/index lookup.
//! - [`StructDesc`]: fixed-shape descriptor, const-constructible from a static name list.
//! - [`ArrayDesc`]: variable-arity descriptor whose element names are decimal indices.
//! - [`Described`]: a type that owns a `'static` descriptor.

use alloc::borrow::Cow;
use alloc::string::ToString;
use core::fmt;

// -----------------------------------------------------------------------------
// ClassDesc

/// The result [`ClassDesc::element_index`] yields for a name the descriptor does not own.
pub const NOT_FOUND: Option<usize> = None;

/// Shape metadata for a serializable type.
///
/// Implementations are immutable and created once per type. Codecs and
/// backends share them as `&'static dyn ClassDesc`.
///
/// For every valid index `i`, `element_index(element_name(i)) == Some(i)`.
/// Unknown names return [`NOT_FOUND`], never an error, so unordered read
/// loops can skip foreign elements.
///
/// # Examples
///
/// ```
/// use vc_serial::desc::{ClassDesc, StructDesc, NOT_FOUND};
///
/// static BOX: StructDesc = StructDesc::new("Box", &["value1", "value2"]);
///
/// assert_eq!(BOX.element_count(None), 2);
/// assert_eq!(BOX.element_name(1).as_deref(), Some("value2"));
/// assert_eq!(BOX.element_index("value1"), Some(0));
/// assert_eq!(BOX.element_index("__not_a_field__"), NOT_FOUND);
/// ```
pub trait ClassDesc: Send + Sync + 'static {
    /// The serial name of the type.
    fn name(&self) -> &str;

    /// Whether the element count depends on the runtime value.
    fn is_array(&self) -> bool {
        false
    }

    /// Number of elements.
    ///
    /// `len` is the runtime length of a variable-arity value.
    /// Fixed-shape descriptors ignore it.
    fn element_count(&self, len: Option<usize>) -> usize;

    /// Name of the element at `index`, `None` if the index is not owned.
    fn element_name(&self, index: usize) -> Option<Cow<'_, str>>;

    /// Index of the element called `name`, or [`NOT_FOUND`].
    fn element_index(&self, name: &str) -> Option<usize>;
}

impl fmt::Debug for dyn ClassDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type that owns a `'static` [`ClassDesc`].
///
/// Implemented by the [`serializable!`](crate::serializable) macro and
/// by hand-written codecs that want to be registered in a
/// [`SerialRegistry`](crate::registry::SerialRegistry).
pub trait Described {
    fn descriptor() -> &'static dyn ClassDesc;
}

// -----------------------------------------------------------------------------
// StructDesc

/// A fixed-shape descriptor with elements in declaration order.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StructDesc {
    name: &'static str,
    elements: &'static [&'static str],
}

impl StructDesc {
    /// Creates a descriptor; `elements` are listed in declaration order.
    #[inline]
    pub const fn new(name: &'static str, elements: &'static [&'static str]) -> Self {
        Self { name, elements }
    }

    /// Returns the element names in declaration order.
    #[inline]
    pub const fn elements(&self) -> &'static [&'static str] {
        self.elements
    }
}

impl ClassDesc for StructDesc {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn element_count(&self, _len: Option<usize>) -> usize {
        self.elements.len()
    }

    #[inline]
    fn element_name(&self, index: usize) -> Option<Cow<'_, str>> {
        self.elements.get(index).map(|name| Cow::Borrowed(*name))
    }

    /// This is O(N) complexity.
    fn element_index(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(|s| *s == name)
    }
}

impl fmt::Debug for StructDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructDesc")
            .field("name", &self.name)
            .field("elements", &self.elements)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ArrayDesc

/// A variable-arity descriptor.
///
/// Element `i` is named by its decimal form. Only canonical decimals
/// (no sign, no leading zeros) map back to an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayDesc {
    name: &'static str,
}

impl ArrayDesc {
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ClassDesc for ArrayDesc {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn is_array(&self) -> bool {
        true
    }

    #[inline]
    fn element_count(&self, len: Option<usize>) -> usize {
        len.unwrap_or(0)
    }

    fn element_name(&self, index: usize) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(index.to_string()))
    }

    fn element_index(&self, name: &str) -> Option<usize> {
        let canonical = !name.is_empty()
            && name.bytes().all(|b| b.is_ascii_digit())
            && (name == "0" || !name.starts_with('0'));
        if canonical { name.parse().ok() } else { NOT_FOUND }
    }
}
