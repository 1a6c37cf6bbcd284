use crate::{
    encoding::{parse_type_encoding_with, EncodingOptions, EncodingType},
    runtime::{Imp, MethodHandle, ObjectRuntime, Selector},
};

/// A method of a class or meta-class
///
/// Argument encodings list every slot the runtime reports, in order. Object runtimes pass the
/// receiver and the selector as two implicit leading arguments, so a method declared without
/// arguments usually still has two entries here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// The runtime handle this descriptor was built from
    pub handle: MethodHandle,
    /// The selector name
    pub name: String,
    /// The selector
    pub selector: Selector,
    /// The implementation entry point
    pub implementation: Imp,
    /// The full type encoding (return type followed by argument types)
    pub type_encoding: Option<String>,
    /// The return type encoding, empty if the runtime reported none
    pub return_type_encoding: String,
    /// One encoding per argument slot, empty for slots without a reported type
    pub argument_type_encodings: Vec<String>,
    options: EncodingOptions,
}

impl MethodInfo {
    /// Build the descriptor of one method.
    ///
    /// Returns `None` only for the null handle.
    ///
    /// ## Arguments
    /// * 'runtime' - The runtime owning the method
    /// * 'handle'  - The method to describe
    /// * 'options' - Classifier options used by [`MethodInfo::return_type`] and
    ///   [`MethodInfo::argument_type`]
    pub fn from_handle(
        runtime: &dyn ObjectRuntime,
        handle: MethodHandle,
        options: &EncodingOptions,
    ) -> Option<MethodInfo> {
        let handle = handle.non_null()?;
        let selector = runtime.method_selector(handle);

        let argument_type_encodings = (0..runtime.method_argument_count(handle))
            .map(|index| {
                runtime
                    .method_argument_type(handle, index)
                    .unwrap_or_default()
            })
            .collect();

        Some(MethodInfo {
            handle,
            name: runtime.selector_name(selector).unwrap_or_default(),
            selector,
            implementation: runtime.method_implementation(handle),
            type_encoding: runtime.method_type_encoding(handle),
            return_type_encoding: runtime.method_return_type(handle).unwrap_or_default(),
            argument_type_encodings,
            options: *options,
        })
    }

    /// The classified return type
    #[must_use]
    pub fn return_type(&self) -> EncodingType {
        parse_type_encoding_with(self.return_type_encoding.as_str(), &self.options)
    }

    /// The classified type of argument slot `index`, `None` past the last slot
    #[must_use]
    pub fn argument_type(&self, index: usize) -> Option<EncodingType> {
        self.argument_type_encodings
            .get(index)
            .map(|encoding| parse_type_encoding_with(encoding.as_str(), &self.options))
    }

    /// The number of argument slots, implicit ones included
    #[must_use]
    pub fn argument_count(&self) -> usize {
        self.argument_type_encodings.len()
    }
}
