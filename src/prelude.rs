//! # objscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the objscope library. Import this module to get quick access to the classifier,
//! the runtime capability and the class metadata cache.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all objscope operations
pub use crate::Error;

/// The result type used throughout objscope
pub use crate::Result;

/// Configuration of the class metadata cache
pub use crate::CacheConfig;

// ================================================================================================
// Type Encodings
// ================================================================================================

/// Classification of type encodings
pub use crate::encoding::{
    parse_object_type, parse_type_encoding, parse_type_encoding_with, EncodingOptions,
    EncodingType, LongWidth, ObjectTypeRef, PropertyFlags, TypeKind, TypeQualifiers,
};

// ================================================================================================
// Object Runtime
// ================================================================================================

/// The runtime capability and its handles
pub use crate::runtime::{
    ClassHandle, FieldHandle, Imp, MethodHandle, ObjectRuntime, PropertyAttribute,
    PropertyHandle, Selector,
};

/// In-memory runtime and its builders
pub use crate::runtime::{ClassBuilder, FieldDef, MethodDef, PropertyDef, TableRuntime};

// ================================================================================================
// Class Metadata
// ================================================================================================

/// Member descriptors
pub use crate::metadata::{parse_attribute_string, FieldInfo, MethodInfo, PropertyInfo};

/// Class records and their cache
pub use crate::metadata::{ClassCache, ClassInfo, ClassInfoRc, ClassMembers};
