//! The object runtime capability consumed by the metadata layer.
//!
//! Reflection never talks to a concrete runtime directly. Everything the descriptors and the
//! cache need is expressed by the [`ObjectRuntime`] trait: class identity and hierarchy,
//! member enumeration, and the per-member queries for names, offsets and type encodings.
//! Members are referred to by opaque `Copy` handles ([`ClassHandle`], [`FieldHandle`], ...)
//! where the raw value `0` is the null handle.
//!
//! Every query returns owned data. A runtime that hands out temporary C buffers copies them
//! before returning, so nothing transient outlives a call.
//!
//! # Implementations
//!
//! - [`TableRuntime`] - an in-memory runtime built from descriptor tables, for tests and for
//!   consumers that describe their types ahead of time
//!
//! # Examples
//!
//! ```rust
//! use objscope::runtime::{ClassBuilder, FieldDef, ObjectRuntime, TableRuntime};
//!
//! let runtime = TableRuntime::new();
//! let class = runtime.register(
//!     ClassBuilder::new("Point")
//!         .field(FieldDef::new("x", "d"))
//!         .field(FieldDef::new("y", "d")),
//! )?;
//!
//! assert_eq!(runtime.class_name(class).as_deref(), Some("Point"));
//! assert_eq!(runtime.fields(class).len(), 2);
//! # Ok::<(), objscope::Error>(())
//! ```

mod table;

pub use table::{ClassBuilder, FieldDef, MethodDef, PropertyDef, TableRuntime};

define_handle! {
    /// Opaque reference to a class or meta-class
    ClassHandle
}

define_handle! {
    /// Opaque reference to an instance variable
    FieldHandle
}

define_handle! {
    /// Opaque reference to a method
    MethodHandle
}

define_handle! {
    /// Opaque reference to a declared property
    PropertyHandle
}

define_handle! {
    /// Interned method name
    Selector
}

define_handle! {
    /// Method implementation entry point
    Imp
}

/// One `key` + `value` token of a property's attribute list
///
/// The runtime reports attributes as an ordered list, e.g. `T@"NSString"`, `&`, `N`,
/// `V_name` become `('T', "@\"NSString\"")`, `('&', "")`, `('N', "")`, `('V', "_name")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyAttribute {
    /// The attribute key character
    pub key: char,
    /// The attribute value, empty for flag attributes
    pub value: String,
}

impl PropertyAttribute {
    /// Create a new attribute token
    pub fn new(key: char, value: impl Into<String>) -> Self {
        PropertyAttribute {
            key,
            value: value.into(),
        }
    }

    /// Create a value-less flag attribute
    #[must_use]
    pub fn flag(key: char) -> Self {
        PropertyAttribute {
            key,
            value: String::new(),
        }
    }
}

/// Reflection queries against a live object runtime.
///
/// Queries on a null or foreign handle return the empty value of their result type (`None`,
/// an empty list, `0`) rather than failing.
///
/// Implementations must be safe to call from many threads at once; the cache calls into the
/// runtime outside of any lock it holds.
pub trait ObjectRuntime: Send + Sync {
    /// The name of a class
    fn class_name(&self, class: ClassHandle) -> Option<String>;

    /// The superclass of a class, `None` for a root class
    fn superclass(&self, class: ClassHandle) -> Option<ClassHandle>;

    /// Returns true if `class` is a meta-class
    fn is_meta_class(&self, class: ClassHandle) -> bool;

    /// The meta-class of a class
    fn meta_class(&self, class: ClassHandle) -> Option<ClassHandle>;

    /// Resolve a class by name
    fn lookup_class(&self, name: &str) -> Option<ClassHandle>;

    /// The instance variables declared directly on `class`
    fn fields(&self, class: ClassHandle) -> Vec<FieldHandle>;

    /// The methods declared directly on `class`
    fn methods(&self, class: ClassHandle) -> Vec<MethodHandle>;

    /// The properties declared directly on `class`
    fn properties(&self, class: ClassHandle) -> Vec<PropertyHandle>;

    /// The name of an instance variable, `None` for anonymous ones
    fn field_name(&self, field: FieldHandle) -> Option<String>;

    /// The byte offset of an instance variable within its instance
    fn field_offset(&self, field: FieldHandle) -> isize;

    /// The type encoding of an instance variable
    fn field_type_encoding(&self, field: FieldHandle) -> Option<String>;

    /// The selector of a method
    fn method_selector(&self, method: MethodHandle) -> Selector;

    /// The name of a selector
    fn selector_name(&self, selector: Selector) -> Option<String>;

    /// The implementation of a method
    fn method_implementation(&self, method: MethodHandle) -> Imp;

    /// The full type encoding of a method
    fn method_type_encoding(&self, method: MethodHandle) -> Option<String>;

    /// The return type encoding of a method
    fn method_return_type(&self, method: MethodHandle) -> Option<String>;

    /// The number of argument slots, including any implicit ones the runtime passes
    fn method_argument_count(&self, method: MethodHandle) -> usize;

    /// The type encoding of argument slot `index`
    fn method_argument_type(&self, method: MethodHandle, index: usize) -> Option<String>;

    /// The name of a property
    fn property_name(&self, property: PropertyHandle) -> Option<String>;

    /// The attribute list of a property, in declaration order
    fn property_attributes(&self, property: PropertyHandle) -> Vec<PropertyAttribute>;
}
