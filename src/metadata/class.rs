//! Per-class metadata records.
//!
//! A [`ClassInfo`] is an immutable snapshot of one class (or meta-class): its identity, its
//! position in the hierarchy, and the fields, methods and properties it declares directly.
//! Inherited members are reached through [`ClassInfo::super_info`] or the `find_*` helpers.
//!
//! Records are shared as [`ClassInfoRc`]. The only mutable state is the `needs_update` flag,
//! which tells holders that the class has changed and a fresh record should be looked up.

use std::{
    collections::HashMap,
    iter,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::trace;

use crate::{
    config::CacheConfig,
    metadata::{FieldInfo, MethodInfo, PropertyInfo},
    runtime::{ClassHandle, FieldHandle, MethodHandle, ObjectRuntime, PropertyHandle},
    Error, Result,
};

/// A reference-counted `ClassInfo`
pub type ClassInfoRc = Arc<ClassInfo>;

/// The members a class declares directly, keyed by name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassMembers {
    /// Named instance variables
    pub fields: HashMap<String, FieldInfo>,
    /// Methods, keyed by selector name
    pub methods: HashMap<String, MethodInfo>,
    /// Declared properties
    pub properties: HashMap<String, PropertyInfo>,
}

impl ClassMembers {
    /// Enumerate and describe the members declared directly on `class`
    ///
    /// ## Arguments
    /// * 'runtime' - The runtime owning the class
    /// * 'class'   - The class to enumerate
    /// * 'config'  - Classifier and property resolution settings
    pub fn collect(runtime: &dyn ObjectRuntime, class: ClassHandle, config: &CacheConfig) -> Self {
        Self::from_handles(
            runtime,
            &runtime.fields(class),
            &runtime.methods(class),
            &runtime.properties(class),
            config,
        )
    }

    /// Describe the given member handles.
    ///
    /// Null handles, anonymous fields and methods whose selector has no name are skipped. When
    /// two members share a name the later one wins.
    pub fn from_handles(
        runtime: &dyn ObjectRuntime,
        fields: &[FieldHandle],
        methods: &[MethodHandle],
        properties: &[PropertyHandle],
        config: &CacheConfig,
    ) -> Self {
        let options = &config.encoding;

        let fields = fields
            .iter()
            .filter_map(|handle| FieldInfo::from_handle(runtime, *handle, options))
            .filter_map(|field| Some((field.name.clone()?, field)))
            .collect();

        let methods = methods
            .iter()
            .filter_map(|handle| MethodInfo::from_handle(runtime, *handle, options))
            .filter(|method| !method.name.is_empty())
            .map(|method| (method.name.clone(), method))
            .collect();

        let properties = properties
            .iter()
            .filter_map(|handle| {
                PropertyInfo::from_handle_with(runtime, *handle, options, |name| {
                    if config.resolve_property_classes {
                        runtime.lookup_class(name)
                    } else {
                        None
                    }
                })
            })
            .map(|property| (property.name.clone(), property))
            .collect();

        ClassMembers {
            fields,
            methods,
            properties,
        }
    }
}

/// Metadata of one class or meta-class.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use objscope::{ClassCache, runtime::{ClassBuilder, MethodDef, TableRuntime}};
///
/// let runtime = Arc::new(TableRuntime::new());
/// runtime.register(ClassBuilder::new("NSObject").method(MethodDef::new("description", "@")))?;
/// runtime.register(ClassBuilder::new("Person").superclass("NSObject"))?;
///
/// let cache = ClassCache::new(runtime);
/// let person = cache.try_lookup_name("Person")?;
///
/// assert!(person.methods().is_empty());
/// assert!(person.find_method("description").is_some());
/// assert_eq!(person.hierarchy().count(), 2);
/// # Ok::<(), objscope::Error>(())
/// ```
#[derive(Debug)]
pub struct ClassInfo {
    /// The class
    pub class: ClassHandle,
    /// The superclass, `None` for a root class
    pub superclass: Option<ClassHandle>,
    /// The meta-class, only recorded for instance-level classes
    pub meta_class: Option<ClassHandle>,
    /// Whether this record describes a meta-class
    pub is_meta: bool,
    /// The class name
    pub name: String,
    /// The record of the superclass
    pub super_info: Option<ClassInfoRc>,
    members: ClassMembers,
    needs_update: AtomicBool,
}

impl ClassInfo {
    /// Build the record of `class` from a fresh enumeration of its members.
    ///
    /// ## Arguments
    /// * 'runtime'    - The runtime owning the class
    /// * 'class'      - The class to describe
    /// * 'super_info' - The already resolved record of the superclass
    /// * 'config'     - Classifier and property resolution settings
    ///
    /// # Errors
    /// - [`Error::NullHandle`] for the null handle
    /// - [`Error::UnnamedClass`] if the runtime reports no name
    pub fn new(
        runtime: &dyn ObjectRuntime,
        class: ClassHandle,
        super_info: Option<ClassInfoRc>,
        config: &CacheConfig,
    ) -> Result<ClassInfo> {
        let class = class.non_null().ok_or(Error::NullHandle)?;
        let name = runtime
            .class_name(class)
            .filter(|name| !name.is_empty())
            .ok_or(Error::UnnamedClass(class))?;
        let is_meta = runtime.is_meta_class(class);

        let members = ClassMembers::collect(runtime, class, config);
        trace!(
            "collected {} fields, {} methods and {} properties for {}{}",
            members.fields.len(),
            members.methods.len(),
            members.properties.len(),
            if is_meta { "meta-class " } else { "" },
            name
        );

        Ok(ClassInfo {
            class,
            superclass: runtime.superclass(class),
            meta_class: if is_meta {
                None
            } else {
                runtime.meta_class(class)
            },
            is_meta,
            name,
            super_info,
            members,
            needs_update: AtomicBool::new(false),
        })
    }

    /// Fields declared directly on this class, keyed by name
    #[must_use]
    pub fn fields(&self) -> &HashMap<String, FieldInfo> {
        &self.members.fields
    }

    /// Methods declared directly on this class, keyed by selector name
    #[must_use]
    pub fn methods(&self) -> &HashMap<String, MethodInfo> {
        &self.members.methods
    }

    /// Properties declared directly on this class, keyed by name
    #[must_use]
    pub fn properties(&self) -> &HashMap<String, PropertyInfo> {
        &self.members.properties
    }

    /// All members declared directly on this class
    #[must_use]
    pub fn members(&self) -> &ClassMembers {
        &self.members
    }

    /// Returns true if the class has changed since this record was built
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.needs_update.load(Ordering::Acquire)
    }

    /// Flag this record as out of date.
    ///
    /// Call this after the class gained or lost members. The next cache lookup rebuilds the
    /// record; this one is left as it is.
    pub fn set_needs_update(&self) {
        self.needs_update.store(true, Ordering::Release);
    }

    /// This record followed by the records of all its superclasses, root last
    pub fn hierarchy(&self) -> impl Iterator<Item = &ClassInfo> {
        iter::successors(Some(self), |info| info.super_info.as_deref())
    }

    /// Find a field on this class or the nearest superclass declaring it
    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.hierarchy().find_map(|info| info.fields().get(name))
    }

    /// Find a method on this class or the nearest superclass declaring it
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<&MethodInfo> {
        self.hierarchy().find_map(|info| info.methods().get(name))
    }

    /// Find a property on this class or the nearest superclass declaring it
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.hierarchy().find_map(|info| info.properties().get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ClassBuilder, FieldDef, MethodDef, PropertyDef, TableRuntime};

    fn runtime() -> (TableRuntime, ClassHandle, ClassHandle) {
        let runtime = TableRuntime::new();
        let root = runtime
            .register(
                ClassBuilder::new("NSObject")
                    .field(FieldDef::new("isa", "#"))
                    .method(MethodDef::new("init", "@"))
                    .method(MethodDef::new("description", "@")),
            )
            .unwrap();
        let person = runtime
            .register(
                ClassBuilder::new("Person")
                    .superclass("NSObject")
                    .field(FieldDef::new("_name", "@\"NSString\""))
                    .field(FieldDef::anonymous("i"))
                    .method(MethodDef::new("description", "@"))
                    .class_method(MethodDef::new("person", "@"))
                    .property(PropertyDef::from_attributes("name", "T@\"NSString\",C,N,V_name")),
            )
            .unwrap();
        (runtime, root, person)
    }

    #[test]
    fn test_builds_record() {
        let (runtime, root, person) = runtime();
        let config = CacheConfig::default();

        let root_info = Arc::new(ClassInfo::new(&runtime, root, None, &config).unwrap());
        let info = ClassInfo::new(&runtime, person, Some(root_info.clone()), &config).unwrap();

        assert_eq!(info.name, "Person");
        assert_eq!(info.class, person);
        assert_eq!(info.superclass, Some(root));
        assert_eq!(info.meta_class, runtime.meta_class(person));
        assert!(!info.is_meta);
        assert!(!info.needs_update());

        // the anonymous field is not keyed
        assert_eq!(info.fields().len(), 1);
        assert!(info.fields().contains_key("_name"));
        assert_eq!(info.methods().len(), 1);
        assert_eq!(info.properties()["name"].setter.as_deref(), Some("setName"));
        assert!(Arc::ptr_eq(info.super_info.as_ref().unwrap(), &root_info));
    }

    #[test]
    fn test_meta_record_has_no_meta_class() {
        let (runtime, _, person) = runtime();
        let meta = runtime.meta_class(person).unwrap();

        let info = ClassInfo::new(&runtime, meta, None, &CacheConfig::default()).unwrap();
        assert!(info.is_meta);
        assert_eq!(info.meta_class, None);
        assert_eq!(info.name, "Person");
        assert!(info.methods().contains_key("person"));
        assert!(info.fields().is_empty());
    }

    #[test]
    fn test_hierarchy_lookup_prefers_nearest_class() {
        let (runtime, root, person) = runtime();
        let config = CacheConfig::default();
        let root_info = Arc::new(ClassInfo::new(&runtime, root, None, &config).unwrap());
        let info = ClassInfo::new(&runtime, person, Some(root_info), &config).unwrap();

        let names: Vec<_> = info.hierarchy().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Person", "NSObject"]);

        let description = info.find_method("description").unwrap();
        assert_eq!(runtime.methods(person)[0], description.handle);
        assert!(info.find_method("init").is_some());
        assert!(info.find_field("isa").is_some());
        assert!(info.find_property("name").is_some());
        assert!(info.find_method("missing").is_none());
    }

    #[test]
    fn test_staleness_flag() {
        let (runtime, root, _) = runtime();
        let info = ClassInfo::new(&runtime, root, None, &CacheConfig::default()).unwrap();

        info.set_needs_update();
        assert!(info.needs_update());
    }

    #[test]
    fn test_build_errors() {
        let (runtime, _, _) = runtime();
        let config = CacheConfig::default();

        assert!(matches!(
            ClassInfo::new(&runtime, ClassHandle::NULL, None, &config),
            Err(Error::NullHandle)
        ));
        assert!(matches!(
            ClassInfo::new(&runtime, ClassHandle::new(500), None, &config),
            Err(Error::UnnamedClass(handle)) if handle == ClassHandle::new(500)
        ));
    }

    #[test]
    fn test_members_skip_null_handles() {
        let (runtime, _, person) = runtime();
        let mut methods = runtime.methods(person);
        methods.insert(0, MethodHandle::NULL);

        let members = ClassMembers::from_handles(
            &runtime,
            &[FieldHandle::NULL],
            &methods,
            &[PropertyHandle::NULL],
            &CacheConfig::default(),
        );
        assert!(members.fields.is_empty());
        assert_eq!(members.methods.len(), 1);
        assert!(members.properties.is_empty());
    }

    #[test]
    fn test_members_skip_unnamed_selectors() {
        let (runtime, _, person) = runtime();
        let mut methods = runtime.methods(person);
        // not a method of this runtime, so its selector has no name
        methods.push(MethodHandle::new(0xdead));

        let members = ClassMembers::from_handles(
            &runtime,
            &[],
            &methods,
            &[],
            &CacheConfig::default(),
        );
        assert_eq!(members.methods.len(), 1);
        assert!(members.methods.contains_key("description"));
        assert!(!members.methods.contains_key(""));
    }

    #[test]
    fn test_property_class_resolution_can_be_disabled() {
        let runtime = TableRuntime::new();
        runtime.register(ClassBuilder::new("NSString")).unwrap();
        let class = runtime
            .register(
                ClassBuilder::new("Label")
                    .property(PropertyDef::from_attributes("text", "T@\"NSString\",C")),
            )
            .unwrap();

        let resolved = ClassMembers::collect(&runtime, class, &CacheConfig::default());
        assert!(resolved.properties["text"].class.is_some());

        let config = CacheConfig::default().with_property_class_resolution(false);
        let unresolved = ClassMembers::collect(&runtime, class, &config);
        assert_eq!(unresolved.properties["text"].class, None);
        assert_eq!(
            unresolved.properties["text"].class_name.as_deref(),
            Some("NSString")
        );
    }
}
