//! Configuration for class metadata caching
//!
//! [`CacheConfig`] controls how member type encodings are classified and how far the cache
//! follows a class hierarchy.

use crate::encoding::EncodingOptions;

/// Default limit on the depth of a superclass chain
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for a [`crate::ClassCache`]
///
/// # Examples
///
/// ```rust
/// use objscope::CacheConfig;
///
/// let config = CacheConfig::lp64().with_max_depth(16);
/// assert_eq!(config.max_depth, 16);
/// assert!(config.resolve_property_classes);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Options for classifying member type encodings
    pub encoding: EncodingOptions,

    /// Maximum length of a superclass chain (default: 64)
    /// Deeper or cyclic hierarchies fail with [`crate::Error::RecursionLimit`]
    pub max_depth: usize,

    /// Resolve the declared class of object-typed properties through the runtime
    /// When disabled, only the class name is recorded
    pub resolve_property_classes: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            encoding: EncodingOptions::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            resolve_property_classes: true,
        }
    }
}

impl CacheConfig {
    /// Defaults, with C `long` classified as a 64-bit integer
    #[must_use]
    pub fn lp64() -> Self {
        Self {
            encoding: EncodingOptions::lp64(),
            ..Self::default()
        }
    }

    /// Use the given classifier options
    #[must_use]
    pub fn with_encoding(mut self, encoding: EncodingOptions) -> Self {
        self.encoding = encoding;
        self
    }

    /// Limit the superclass chain to `max_depth` records
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable or disable resolving declared property classes
    #[must_use]
    pub fn with_property_class_resolution(mut self, enabled: bool) -> Self {
        self.resolve_property_classes = enabled;
        self
    }
}
