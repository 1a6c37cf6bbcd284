//! In-memory object runtime built from descriptor tables.
//!
//! [`TableRuntime`] implements [`ObjectRuntime`] over classes registered at run time with
//! [`ClassBuilder`]. It behaves like a live object runtime where it matters to reflection:
//!
//! - Registering a class also creates its meta-class, which carries the class methods. The
//!   meta-class of a subclass inherits from the meta-class of its superclass, and the
//!   meta-class of a root class inherits from the root class itself.
//! - Methods report the two implicit leading argument slots (`@` receiver, `:` selector)
//!   ahead of their declared arguments.
//! - Members can be added to and removed from registered classes, so stale metadata can be
//!   observed and refreshed.
//!
//! # Storage
//!
//! - Classes live in a lock-free `SkipMap` keyed by handle, with a `DashMap` name index
//! - Member definitions live in append-only `boxcar` arenas; a member handle is its arena
//!   index plus one, so handles stay valid after a member is removed from its class
//! - Selector names are interned, one [`Selector`] per distinct name
//!
//! # Examples
//!
//! ```rust
//! use objscope::runtime::{ClassBuilder, MethodDef, ObjectRuntime, PropertyDef, TableRuntime};
//!
//! let runtime = TableRuntime::new();
//! let root = runtime.register(ClassBuilder::new("NSObject").method(MethodDef::new("init", "@")))?;
//! let person = runtime.register(
//!     ClassBuilder::new("Person")
//!         .superclass("NSObject")
//!         .property(PropertyDef::from_attributes("name", "T@\"NSString\",C,N,V_name")),
//! )?;
//!
//! assert_eq!(runtime.superclass(person), Some(root));
//! let meta = runtime.meta_class(person).unwrap();
//! assert!(runtime.is_meta_class(meta));
//! # Ok::<(), objscope::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    metadata::parse_attribute_string,
    runtime::{
        ClassHandle, FieldHandle, Imp, MethodHandle, ObjectRuntime, PropertyAttribute,
        PropertyHandle, Selector,
    },
    Error, Result,
};

/// Size of one instance slot; the first slot of every instance holds its class pointer
const SLOT_SIZE: isize = 8;

/// Definition of an instance variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// The name, `None` for an anonymous field
    pub name: Option<String>,
    /// The type encoding, if one is reported
    pub type_encoding: Option<String>,
    /// Explicit byte offset, assigned from the class layout when `None`
    pub offset: Option<isize>,
}

impl FieldDef {
    /// A named field with a type encoding
    pub fn new(name: impl Into<String>, type_encoding: impl Into<String>) -> Self {
        FieldDef {
            name: Some(name.into()),
            type_encoding: Some(type_encoding.into()),
            offset: None,
        }
    }

    /// A field without a name
    pub fn anonymous(type_encoding: impl Into<String>) -> Self {
        FieldDef {
            name: None,
            type_encoding: Some(type_encoding.into()),
            offset: None,
        }
    }

    /// Place the field at an explicit byte offset
    #[must_use]
    pub fn at_offset(mut self, offset: isize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Drop the type encoding, as runtimes do for some synthesized fields
    #[must_use]
    pub fn without_encoding(mut self) -> Self {
        self.type_encoding = None;
        self
    }
}

/// Definition of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    /// The selector name
    pub name: String,
    /// The return type encoding
    pub return_type: String,
    /// Declared argument encodings, after the implicit receiver and selector slots.
    /// `None` is a slot whose type the runtime cannot report.
    pub arguments: Vec<Option<String>>,
    /// Explicit full type encoding, derived from the return and argument types when `None`
    pub type_encoding: Option<String>,
    /// Explicit implementation, one is assigned on registration when `None`
    pub implementation: Option<Imp>,
}

impl MethodDef {
    /// A method taking no declared arguments
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        MethodDef {
            name: name.into(),
            return_type: return_type.into(),
            arguments: Vec::new(),
            type_encoding: None,
            implementation: None,
        }
    }

    /// Append a declared argument
    #[must_use]
    pub fn argument(mut self, type_encoding: impl Into<String>) -> Self {
        self.arguments.push(Some(type_encoding.into()));
        self
    }

    /// Append a declared argument whose type is not reported
    #[must_use]
    pub fn opaque_argument(mut self) -> Self {
        self.arguments.push(None);
        self
    }

    /// Override the full type encoding
    #[must_use]
    pub fn encoding(mut self, type_encoding: impl Into<String>) -> Self {
        self.type_encoding = Some(type_encoding.into());
        self
    }

    /// Use a specific implementation
    #[must_use]
    pub fn implementation(mut self, imp: Imp) -> Self {
        self.implementation = Some(imp);
        self
    }

    /// Every argument slot the runtime reports: receiver, selector, then the declared ones
    fn argument_slots(&self) -> Vec<Option<String>> {
        let mut slots = Vec::with_capacity(self.arguments.len() + 2);
        slots.push(Some("@".to_string()));
        slots.push(Some(":".to_string()));
        slots.extend(self.arguments.iter().cloned());
        slots
    }

    fn derived_encoding(&self) -> String {
        self.argument_slots()
            .iter()
            .flatten()
            .fold(self.return_type.clone(), |mut acc, arg| {
                acc.push_str(arg);
                acc
            })
    }
}

/// Definition of a declared property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    /// The property name
    pub name: String,
    /// The attribute list, in order
    pub attributes: Vec<PropertyAttribute>,
}

impl PropertyDef {
    /// A property without attributes
    pub fn new(name: impl Into<String>) -> Self {
        PropertyDef {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// A property with attributes given in runtime string form, e.g. `T@"NSString",C,N,V_name`
    pub fn from_attributes(name: impl Into<String>, attributes: &str) -> Self {
        PropertyDef {
            name: name.into(),
            attributes: parse_attribute_string(attributes),
        }
    }

    /// Append an attribute
    #[must_use]
    pub fn attribute(mut self, key: char, value: impl Into<String>) -> Self {
        self.attributes.push(PropertyAttribute::new(key, value));
        self
    }

    /// Append a value-less attribute
    #[must_use]
    pub fn flag(mut self, key: char) -> Self {
        self.attributes.push(PropertyAttribute::flag(key));
        self
    }
}

/// Definition of a class to register with a [`TableRuntime`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassBuilder {
    name: String,
    superclass: Option<String>,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    class_methods: Vec<MethodDef>,
    properties: Vec<PropertyDef>,
}

impl ClassBuilder {
    /// Start a root class definition
    pub fn new(name: impl Into<String>) -> Self {
        ClassBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Inherit from an already registered class
    #[must_use]
    pub fn superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    /// Add an instance variable
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add an instance method
    #[must_use]
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a class method (registered on the meta-class)
    #[must_use]
    pub fn class_method(mut self, method: MethodDef) -> Self {
        self.class_methods.push(method);
        self
    }

    /// Add a declared property
    #[must_use]
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }
}

/// A method as stored in the arena
struct MethodRecord {
    selector: Selector,
    implementation: Imp,
    type_encoding: Option<String>,
    return_type: String,
    arguments: Vec<Option<String>>,
}

/// A registered class or meta-class
struct ClassEntry {
    name: String,
    superclass: Option<ClassHandle>,
    meta_class: Option<ClassHandle>,
    is_meta: bool,
    fields: RwLock<Vec<FieldHandle>>,
    methods: RwLock<Vec<MethodHandle>>,
    properties: RwLock<Vec<PropertyHandle>>,
}

impl ClassEntry {
    fn new(
        name: String,
        superclass: Option<ClassHandle>,
        meta_class: Option<ClassHandle>,
        is_meta: bool,
    ) -> Self {
        ClassEntry {
            name,
            superclass,
            meta_class,
            is_meta,
            fields: RwLock::new(Vec::new()),
            methods: RwLock::new(Vec::new()),
            properties: RwLock::new(Vec::new()),
        }
    }
}

/// Converts a member handle value into its arena index
fn arena_index(value: u64) -> Option<usize> {
    usize::try_from(value.checked_sub(1)?).ok()
}

/// Converts an arena index into a member handle value
fn handle_value(index: usize) -> u64 {
    index as u64 + 1
}

/// An [`ObjectRuntime`] backed by in-memory descriptor tables.
///
/// `TableRuntime` is `Send + Sync`; registration and member mutation may run concurrently
/// with reflection queries.
pub struct TableRuntime {
    /// Primary storage for classes and meta-classes
    classes: SkipMap<ClassHandle, Arc<ClassEntry>>,
    /// Name index over instance-level classes
    classes_by_name: DashMap<String, ClassHandle>,
    /// Next class handle value
    next_class: AtomicU64,
    /// Next implementation address handed to methods without an explicit one
    next_imp: AtomicU64,
    fields: boxcar::Vec<FieldDef>,
    methods: boxcar::Vec<MethodRecord>,
    properties: boxcar::Vec<PropertyDef>,
    selectors: boxcar::Vec<String>,
    selectors_by_name: DashMap<String, Selector>,
}

impl Default for TableRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRuntime {
    /// Create an empty runtime
    #[must_use]
    pub fn new() -> Self {
        TableRuntime {
            classes: SkipMap::new(),
            classes_by_name: DashMap::new(),
            next_class: AtomicU64::new(1),
            next_imp: AtomicU64::new(0x1000),
            fields: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
            properties: boxcar::Vec::new(),
            selectors: boxcar::Vec::new(),
            selectors_by_name: DashMap::new(),
        }
    }

    /// The number of registered classes, not counting meta-classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes_by_name.len()
    }

    /// Returns true if no class has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes_by_name.is_empty()
    }

    /// Register a class and its meta-class.
    ///
    /// Returns the handle of the instance-level class.
    ///
    /// # Errors
    /// - [`Error::Malformed`] if the class or one of its methods has an empty name
    /// - [`Error::ClassNotFound`] if the superclass is not registered
    /// - [`Error::DuplicateClass`] if a class with the same name exists
    pub fn register(&self, builder: ClassBuilder) -> Result<ClassHandle> {
        if builder.name.is_empty() {
            return Err(malformed_error!("Class name must not be empty"));
        }
        if let Some(method) = builder
            .methods
            .iter()
            .chain(builder.class_methods.iter())
            .find(|method| method.name.is_empty())
        {
            return Err(malformed_error!(
                "Method of class '{}' has an empty selector (returns '{}')",
                builder.name,
                method.return_type
            ));
        }

        // Resolved before the name entry is locked, both live in the same map
        let superclass = match &builder.superclass {
            Some(name) => Some(
                self.lookup_class(name)
                    .ok_or_else(|| Error::ClassNotFound(name.clone()))?,
            ),
            None => None,
        };

        match self.classes_by_name.entry(builder.name.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateClass(builder.name)),
            Entry::Vacant(slot) => {
                let class = ClassHandle::new(self.next_class.fetch_add(2, Ordering::Relaxed));
                let meta = ClassHandle::new(class.value() + 1);

                let meta_superclass = match superclass {
                    Some(parent) => self.entry(parent)?.meta_class,
                    None => Some(class),
                };

                let class_entry = Arc::new(ClassEntry::new(
                    builder.name.clone(),
                    superclass,
                    Some(meta),
                    false,
                ));
                let meta_entry = Arc::new(ClassEntry::new(
                    builder.name.clone(),
                    meta_superclass,
                    None,
                    true,
                ));

                for field in builder.fields {
                    self.push_field(&class_entry, field);
                }
                for method in builder.methods {
                    self.push_method(&class_entry, method);
                }
                for method in builder.class_methods {
                    self.push_method(&meta_entry, method);
                }
                for property in builder.properties {
                    self.push_property(&class_entry, property);
                }

                self.classes.insert(class, class_entry);
                self.classes.insert(meta, meta_entry);
                slot.insert(class);

                Ok(class)
            }
        }
    }

    /// Add an instance variable to a registered class
    ///
    /// # Errors
    /// Returns [`Error::UnknownHandle`] if `class` is not registered
    pub fn add_field(&self, class: ClassHandle, field: FieldDef) -> Result<FieldHandle> {
        let entry = self.entry(class)?;
        Ok(self.push_field(&entry, field))
    }

    /// Add a method to a registered class (or meta-class)
    ///
    /// # Errors
    /// - [`Error::UnknownHandle`] if `class` is not registered
    /// - [`Error::Malformed`] if the method name is empty
    pub fn add_method(&self, class: ClassHandle, method: MethodDef) -> Result<MethodHandle> {
        if method.name.is_empty() {
            return Err(malformed_error!("Method selector must not be empty"));
        }

        let entry = self.entry(class)?;
        Ok(self.push_method(&entry, method))
    }

    /// Add a class method, i.e. a method on the meta-class of `class`
    ///
    /// # Errors
    /// - [`Error::UnknownHandle`] if `class` is not registered or has no meta-class
    /// - [`Error::Malformed`] if the method name is empty
    pub fn add_class_method(&self, class: ClassHandle, method: MethodDef) -> Result<MethodHandle> {
        let meta = self
            .entry(class)?
            .meta_class
            .ok_or(Error::UnknownHandle(class.value()))?;

        self.add_method(meta, method)
    }

    /// Add a declared property to a registered class
    ///
    /// # Errors
    /// Returns [`Error::UnknownHandle`] if `class` is not registered
    pub fn add_property(
        &self,
        class: ClassHandle,
        property: PropertyDef,
    ) -> Result<PropertyHandle> {
        let entry = self.entry(class)?;
        Ok(self.push_property(&entry, property))
    }

    /// Remove every method named `name` from a class.
    ///
    /// Returns true if a method was removed.
    ///
    /// # Errors
    /// Returns [`Error::UnknownHandle`] if `class` is not registered
    pub fn remove_method(&self, class: ClassHandle, name: &str) -> Result<bool> {
        let entry = self.entry(class)?;
        let Some(selector) = self.selectors_by_name.get(name).map(|s| *s) else {
            return Ok(false);
        };

        Ok(with_write!(entry.methods, |methods: &mut Vec<MethodHandle>| {
            let before = methods.len();
            methods.retain(|handle| {
                self.method_record(*handle)
                    .map_or(true, |record| record.selector != selector)
            });
            methods.len() != before
        }))
    }

    /// Remove every property named `name` from a class.
    ///
    /// Returns true if a property was removed.
    ///
    /// # Errors
    /// Returns [`Error::UnknownHandle`] if `class` is not registered
    pub fn remove_property(&self, class: ClassHandle, name: &str) -> Result<bool> {
        let entry = self.entry(class)?;

        Ok(with_write!(entry.properties, |properties: &mut Vec<PropertyHandle>| {
            let before = properties.len();
            properties.retain(|handle| {
                self.property_def(*handle)
                    .map_or(true, |property| property.name != name)
            });
            properties.len() != before
        }))
    }

    /// Interned selector for `name`
    pub fn selector(&self, name: &str) -> Selector {
        *self
            .selectors_by_name
            .entry(name.to_string())
            .or_insert_with(|| Selector::new(handle_value(self.selectors.push(name.to_string()))))
    }

    fn entry(&self, class: ClassHandle) -> Result<Arc<ClassEntry>> {
        self.classes
            .get(&class)
            .map(|entry| entry.value().clone())
            .ok_or(Error::UnknownHandle(class.value()))
    }

    fn class_entry(&self, class: ClassHandle) -> Option<Arc<ClassEntry>> {
        self.classes.get(&class).map(|entry| entry.value().clone())
    }

    fn push_field(&self, class: &ClassEntry, mut field: FieldDef) -> FieldHandle {
        with_write!(class.fields, |fields: &mut Vec<FieldHandle>| {
            if field.offset.is_none() {
                let slot = isize::try_from(fields.len()).unwrap_or(isize::MAX - 1) + 1;
                field.offset = Some(slot.saturating_mul(SLOT_SIZE));
            }

            let handle = FieldHandle::new(handle_value(self.fields.push(field)));
            fields.push(handle);
            handle
        })
    }

    fn push_method(&self, class: &ClassEntry, method: MethodDef) -> MethodHandle {
        let selector = self.selector(&method.name);
        let type_encoding = Some(
            method
                .type_encoding
                .clone()
                .unwrap_or_else(|| method.derived_encoding()),
        );
        let arguments = method.argument_slots();

        let record = MethodRecord {
            selector,
            implementation: method
                .implementation
                .unwrap_or_else(|| Imp::new(self.next_imp.fetch_add(1, Ordering::Relaxed))),
            type_encoding,
            return_type: method.return_type,
            arguments,
        };

        let handle = MethodHandle::new(handle_value(self.methods.push(record)));
        with_write!(class.methods, |methods: &mut Vec<MethodHandle>| methods
            .push(handle));
        handle
    }

    fn push_property(&self, class: &ClassEntry, property: PropertyDef) -> PropertyHandle {
        let handle = PropertyHandle::new(handle_value(self.properties.push(property)));
        with_write!(class.properties, |properties: &mut Vec<PropertyHandle>| {
            properties.push(handle);
        });
        handle
    }

    fn field_def(&self, field: FieldHandle) -> Option<&FieldDef> {
        self.fields.get(arena_index(field.value())?)
    }

    fn method_record(&self, method: MethodHandle) -> Option<&MethodRecord> {
        self.methods.get(arena_index(method.value())?)
    }

    fn property_def(&self, property: PropertyHandle) -> Option<&PropertyDef> {
        self.properties.get(arena_index(property.value())?)
    }
}

impl ObjectRuntime for TableRuntime {
    fn class_name(&self, class: ClassHandle) -> Option<String> {
        self.class_entry(class).map(|entry| entry.name.clone())
    }

    fn superclass(&self, class: ClassHandle) -> Option<ClassHandle> {
        self.class_entry(class)?.superclass
    }

    fn is_meta_class(&self, class: ClassHandle) -> bool {
        self.class_entry(class).is_some_and(|entry| entry.is_meta)
    }

    fn meta_class(&self, class: ClassHandle) -> Option<ClassHandle> {
        self.class_entry(class)?.meta_class
    }

    fn lookup_class(&self, name: &str) -> Option<ClassHandle> {
        self.classes_by_name.get(name).map(|class| *class)
    }

    fn fields(&self, class: ClassHandle) -> Vec<FieldHandle> {
        self.class_entry(class)
            .map(|entry| read_lock!(entry.fields).clone())
            .unwrap_or_default()
    }

    fn methods(&self, class: ClassHandle) -> Vec<MethodHandle> {
        self.class_entry(class)
            .map(|entry| read_lock!(entry.methods).clone())
            .unwrap_or_default()
    }

    fn properties(&self, class: ClassHandle) -> Vec<PropertyHandle> {
        self.class_entry(class)
            .map(|entry| read_lock!(entry.properties).clone())
            .unwrap_or_default()
    }

    fn field_name(&self, field: FieldHandle) -> Option<String> {
        self.field_def(field)?.name.clone()
    }

    fn field_offset(&self, field: FieldHandle) -> isize {
        self.field_def(field)
            .and_then(|field| field.offset)
            .unwrap_or_default()
    }

    fn field_type_encoding(&self, field: FieldHandle) -> Option<String> {
        self.field_def(field)?.type_encoding.clone()
    }

    fn method_selector(&self, method: MethodHandle) -> Selector {
        self.method_record(method)
            .map(|record| record.selector)
            .unwrap_or_default()
    }

    fn selector_name(&self, selector: Selector) -> Option<String> {
        self.selectors.get(arena_index(selector.value())?).cloned()
    }

    fn method_implementation(&self, method: MethodHandle) -> Imp {
        self.method_record(method)
            .map(|record| record.implementation)
            .unwrap_or_default()
    }

    fn method_type_encoding(&self, method: MethodHandle) -> Option<String> {
        self.method_record(method)?.type_encoding.clone()
    }

    fn method_return_type(&self, method: MethodHandle) -> Option<String> {
        self.method_record(method)
            .map(|record| record.return_type.clone())
    }

    fn method_argument_count(&self, method: MethodHandle) -> usize {
        self.method_record(method)
            .map(|record| record.arguments.len())
            .unwrap_or_default()
    }

    fn method_argument_type(&self, method: MethodHandle, index: usize) -> Option<String> {
        self.method_record(method)?.arguments.get(index)?.clone()
    }

    fn property_name(&self, property: PropertyHandle) -> Option<String> {
        self.property_def(property)
            .map(|property| property.name.clone())
    }

    fn property_attributes(&self, property: PropertyHandle) -> Vec<PropertyAttribute> {
        self.property_def(property)
            .map(|property| property.attributes.clone())
            .unwrap_or_default()
    }
}
