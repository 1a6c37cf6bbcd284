use crate::{
    encoding::{parse_type_encoding_with, EncodingOptions, EncodingType},
    runtime::{FieldHandle, ObjectRuntime},
};

/// An instance variable of a class, with its type encoding classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// The runtime handle this descriptor was built from
    pub handle: FieldHandle,
    /// The field name, `None` for anonymous fields
    pub name: Option<String>,
    /// Byte offset of the field within an instance
    pub offset: isize,
    /// The raw type encoding as reported by the runtime
    pub type_encoding: Option<String>,
    /// The classified type encoding
    pub encoding: EncodingType,
}

impl FieldInfo {
    /// Build the descriptor of one instance variable.
    ///
    /// Returns `None` only for the null handle.
    ///
    /// ## Arguments
    /// * 'runtime' - The runtime owning the field
    /// * 'handle'  - The field to describe
    /// * 'options' - Classifier options for the type encoding
    pub fn from_handle(
        runtime: &dyn ObjectRuntime,
        handle: FieldHandle,
        options: &EncodingOptions,
    ) -> Option<FieldInfo> {
        let handle = handle.non_null()?;
        let type_encoding = runtime.field_type_encoding(handle);

        Some(FieldInfo {
            handle,
            name: runtime.field_name(handle),
            offset: runtime.field_offset(handle),
            encoding: parse_type_encoding_with(type_encoding.as_deref(), options),
            type_encoding,
        })
    }
}
