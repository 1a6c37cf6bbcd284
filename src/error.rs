use thiserror::Error;

use crate::runtime::ClassHandle;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Reflection itself is non-exceptional: an unparseable type encoding degrades to
/// [`crate::encoding::TypeKind::Unknown`] and a broken member is dropped from its class. The
/// variants below only explain *why* a lookup produced no class record, or why a
/// [`crate::runtime::TableRuntime`] rejected a definition.
///
/// # Error Categories
///
/// ## Lookup Errors
/// - [`Error::NullHandle`] - The null class handle was passed in
/// - [`Error::ClassNotFound`] - A class name did not resolve to a live class
/// - [`Error::UnnamedClass`] - The runtime reported no name for a class handle
/// - [`Error::RecursionLimit`] - The superclass chain is deeper than allowed (or cyclic)
///
/// ## Runtime Table Errors
/// - [`Error::UnknownHandle`] - A handle does not belong to the runtime it was passed to
/// - [`Error::DuplicateClass`] - A class name is already registered
/// - [`Error::Malformed`] - A definition is structurally invalid
///
/// # Examples
///
/// ```rust
/// use objscope::{ClassCache, Error, runtime::TableRuntime};
/// use std::sync::Arc;
///
/// let cache = ClassCache::new(Arc::new(TableRuntime::new()));
/// match cache.try_lookup_name("Missing") {
///     Ok(info) => println!("{} has {} methods", info.name, info.methods().len()),
///     Err(Error::ClassNotFound(name)) => println!("no class named {name}"),
///     Err(e) => println!("Error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The null handle was supplied where a live class was expected.
    ///
    /// This is the "absent input" case of a lookup and is not worth logging.
    #[error("The null handle was supplied")]
    NullHandle,

    /// The class name does not resolve to a live class.
    ///
    /// The associated value is the name that was looked up.
    #[error("No class named '{0}'")]
    ClassNotFound(String),

    /// The runtime did not report a name for the class.
    ///
    /// Class records are cached by name, so a nameless class cannot be cached.
    #[error("The class {0} has no name")]
    UnnamedClass(ClassHandle),

    /// A handle does not refer to an entry of the runtime it was handed to.
    ///
    /// The associated value is the raw handle value.
    #[error("Unknown handle - 0x{0:x}")]
    UnknownHandle(u64),

    /// A class with this name has already been registered.
    #[error("A class named '{0}' is already registered")]
    DuplicateClass(String),

    /// Recursion limit reached.
    ///
    /// Superclass records are resolved recursively. To prevent stack overflow on very deep
    /// or cyclic class hierarchies, a maximum depth is enforced (see
    /// [`crate::CacheConfig::max_depth`]).
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A definition handed to the runtime is invalid.
    ///
    /// The error includes the source location where the problem was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
