use crate::{
    encoding::{
        parse_type_encoding_with, EncodingOptions, EncodingParser, EncodingType, PropertyFlags,
        TypeKind,
    },
    runtime::{ClassHandle, ObjectRuntime, PropertyAttribute, PropertyHandle},
};

/// Split a runtime attribute string such as `T@"NSString",&,N,V_name` into tokens.
///
/// Tokens are comma separated; the first character of each is the key and the remainder the
/// value. Empty tokens are skipped.
///
/// ## Arguments
/// * 'attributes' - The attribute string
///
/// # Examples
///
/// ```rust
/// use objscope::metadata::parse_attribute_string;
///
/// let tokens = parse_attribute_string("Tq,N,V_count");
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[0].key, 'T');
/// assert_eq!(tokens[0].value, "q");
/// assert_eq!(tokens[2].value, "_count");
/// ```
#[must_use]
pub fn parse_attribute_string(attributes: &str) -> Vec<PropertyAttribute> {
    attributes
        .split(',')
        .filter_map(|token| {
            let mut chars = token.chars();
            let key = chars.next()?;
            Some(PropertyAttribute::new(key, chars.as_str()))
        })
        .collect()
}

/// The conventional setter name of a property: `set` + capitalized name
fn default_setter(name: &str) -> String {
    let mut chars = name.chars();
    let mut setter = String::from("set");
    if let Some(first) = chars.next() {
        setter.extend(first.to_uppercase());
        setter.push_str(chars.as_str());
    }
    setter
}

/// A declared property, with its attribute list decoded
///
/// # Examples
///
/// ```rust
/// use objscope::encoding::{EncodingOptions, TypeKind};
/// use objscope::metadata::{parse_attribute_string, PropertyInfo};
/// use objscope::runtime::PropertyHandle;
///
/// let property = PropertyInfo::from_attributes(
///     PropertyHandle::new(1),
///     "delegate",
///     &parse_attribute_string("T@\"NSObject\"<UITableViewDelegate>,W,N,V_delegate"),
///     &EncodingOptions::default(),
///     |_| None,
/// );
///
/// assert_eq!(property.encoding.kind, TypeKind::Object);
/// assert!(property.is_weak());
/// assert_eq!(property.class_name.as_deref(), Some("NSObject"));
/// assert_eq!(property.protocols, vec!["UITableViewDelegate"]);
/// assert_eq!(property.setter.as_deref(), Some("setDelegate"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    /// The runtime handle this descriptor was built from
    pub handle: PropertyHandle,
    /// The property name
    pub name: String,
    /// Kind and qualifiers of the declared type, merged with the property attributes
    pub encoding: EncodingType,
    /// The raw type encoding of the `T` attribute
    pub type_encoding: Option<String>,
    /// The backing instance variable (`V` attribute)
    pub ivar_name: Option<String>,
    /// The declared class of an object-typed property
    pub class_name: Option<String>,
    /// The declared class, resolved through the runtime
    pub class: Option<ClassHandle>,
    /// Protocols the declared type conforms to, in declaration order
    pub protocols: Vec<String>,
    /// The getter selector name
    pub getter: Option<String>,
    /// The setter selector name
    pub setter: Option<String>,
}

impl PropertyInfo {
    /// Build the descriptor of one declared property.
    ///
    /// The declared class name is resolved through [`ObjectRuntime::lookup_class`]. Returns
    /// `None` only for the null handle.
    ///
    /// ## Arguments
    /// * 'runtime' - The runtime owning the property
    /// * 'handle'  - The property to describe
    /// * 'options' - Classifier options for the `T` attribute
    pub fn from_handle(
        runtime: &dyn ObjectRuntime,
        handle: PropertyHandle,
        options: &EncodingOptions,
    ) -> Option<PropertyInfo> {
        Self::from_handle_with(runtime, handle, options, |name| runtime.lookup_class(name))
    }

    /// Build the descriptor of one declared property, resolving its declared class with
    /// `resolver`.
    ///
    /// Returns `None` only for the null handle.
    ///
    /// ## Arguments
    /// * 'runtime'  - The runtime owning the property
    /// * 'handle'   - The property to describe
    /// * 'options'  - Classifier options for the `T` attribute
    /// * 'resolver' - Maps a declared class name to a class
    pub fn from_handle_with<F>(
        runtime: &dyn ObjectRuntime,
        handle: PropertyHandle,
        options: &EncodingOptions,
        resolver: F,
    ) -> Option<PropertyInfo>
    where
        F: Fn(&str) -> Option<ClassHandle>,
    {
        let handle = handle.non_null()?;

        Some(PropertyInfo::from_attributes(
            handle,
            runtime.property_name(handle).unwrap_or_default(),
            &runtime.property_attributes(handle),
            options,
            resolver,
        ))
    }

    /// Build a property descriptor from an explicit attribute list.
    ///
    /// Attributes are processed once, in order. Unknown keys are ignored. After the scan, a
    /// property with a non-empty name gets its conventional accessor names where no custom
    /// ones were declared.
    ///
    /// ## Arguments
    /// * 'handle'     - The handle to record
    /// * 'name'       - The property name
    /// * 'attributes' - The attribute tokens
    /// * 'options'    - Classifier options for the `T` attribute
    /// * 'resolver'   - Maps a declared class name to a class
    pub fn from_attributes<F>(
        handle: PropertyHandle,
        name: impl Into<String>,
        attributes: &[PropertyAttribute],
        options: &EncodingOptions,
        resolver: F,
    ) -> PropertyInfo
    where
        F: Fn(&str) -> Option<ClassHandle>,
    {
        let mut property = PropertyInfo {
            handle,
            name: name.into(),
            encoding: EncodingType::UNKNOWN,
            type_encoding: None,
            ivar_name: None,
            class_name: None,
            class: None,
            protocols: Vec::new(),
            getter: None,
            setter: None,
        };
        let mut flags = PropertyFlags::empty();

        for attribute in attributes {
            match attribute.key {
                'T' => property.apply_type(&attribute.value, options, &resolver),
                'V' => property.ivar_name = Some(attribute.value.clone()),
                'R' => flags |= PropertyFlags::READONLY,
                'C' => flags |= PropertyFlags::COPY,
                '&' => flags |= PropertyFlags::RETAIN,
                'N' => flags |= PropertyFlags::NONATOMIC,
                'D' => flags |= PropertyFlags::DYNAMIC,
                'W' => flags |= PropertyFlags::WEAK,
                'G' => {
                    flags |= PropertyFlags::CUSTOM_GETTER;
                    property.getter = Some(attribute.value.clone());
                }
                'S' => {
                    flags |= PropertyFlags::CUSTOM_SETTER;
                    property.setter = Some(attribute.value.clone());
                }
                _ => {}
            }
        }

        property.encoding = property.encoding.with_property(flags);

        if !property.name.is_empty() {
            if property.getter.is_none() {
                property.getter = Some(property.name.clone());
            }
            if property.setter.is_none() {
                property.setter = Some(default_setter(&property.name));
            }
        }

        property
    }

    /// Record the `T` attribute: classification, and for object types the declared class
    /// and protocols
    fn apply_type<F>(&mut self, value: &str, options: &EncodingOptions, resolver: &F)
    where
        F: Fn(&str) -> Option<ClassHandle>,
    {
        self.type_encoding = Some(value.to_string());
        self.encoding = parse_type_encoding_with(value, options);

        if self.encoding.kind != TypeKind::Object {
            return;
        }

        if let Some(object) = EncodingParser::new(value, options).parse_object_type() {
            self.class = object.class_name.as_deref().and_then(resolver);
            self.class_name = object.class_name;
            self.protocols = object.protocols;
        }
    }

    /// Returns true for `readonly` properties
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.encoding.property.contains(PropertyFlags::READONLY)
    }

    /// Returns true for `copy` properties
    #[must_use]
    pub fn is_copy(&self) -> bool {
        self.encoding.property.contains(PropertyFlags::COPY)
    }

    /// Returns true for `weak` properties
    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.encoding.property.contains(PropertyFlags::WEAK)
    }

    /// Returns true for `nonatomic` properties
    #[must_use]
    pub fn is_nonatomic(&self) -> bool {
        self.encoding.property.contains(PropertyFlags::NONATOMIC)
    }

    /// Returns true for `@dynamic` properties
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.encoding.property.contains(PropertyFlags::DYNAMIC)
    }
}
