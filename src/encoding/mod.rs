//! Type-encoding classification.
//!
//! Object runtimes describe the type of every field, method slot and property with a compact
//! encoding string: an optional run of qualifier characters followed by a type character
//! (`i` for `int`, `@` for an object reference, `{CGPoint=dd}` for a struct and so on). This
//! module turns such a string into an [`EncodingType`] without ever failing.
//!
//! # Classification
//!
//! - **Qualifiers** - the prefix characters `r n N o O R V` accumulate into [`TypeQualifiers`]
//!   in any order and with repeats
//! - **Kind** - the first remaining character selects exactly one [`TypeKind`]; only `@?`
//!   looks at a second character, and only when the whole remainder is `@?`
//! - **Property attributes** - [`PropertyFlags`] are never produced by the classifier. They
//!   are merged in by [`crate::metadata::PropertyInfo`] from the attribute list
//!
//! Aggregate encodings (`{`, `(`, `[`, `^`) are classified by their opening character only;
//! their member or element types are not parsed.
//!
//! # Examples
//!
//! ```rust
//! use objscope::encoding::{parse_type_encoding, TypeKind, TypeQualifiers};
//!
//! assert_eq!(parse_type_encoding("@?").kind, TypeKind::Block);
//! assert_eq!(parse_type_encoding("{CGSize=dd}").kind, TypeKind::Struct);
//!
//! let ty = parse_type_encoding("r*");
//! assert_eq!(ty.kind, TypeKind::CString);
//! assert!(ty.qualifiers.contains(TypeQualifiers::CONST));
//!
//! // absent and empty input are the same
//! assert!(parse_type_encoding(None).is_unknown());
//! assert!(parse_type_encoding("").is_unknown());
//! ```
//!
//! The C `long` type has no fixed width in the encoding alphabet. By default `l` and `L`
//! classify as 32-bit integers; [`EncodingOptions::lp64`] selects 64-bit:
//!
//! ```rust
//! use objscope::encoding::{parse_type_encoding_with, EncodingOptions, TypeKind};
//!
//! let ty = parse_type_encoding_with("L", &EncodingOptions::lp64());
//! assert_eq!(ty.kind, TypeKind::UInt64);
//! ```

mod parser;
mod scanner;
mod types;

pub use parser::*;
pub use scanner::Scanner;
pub use types::*;

/// Classify a type encoding with the default [`EncodingOptions`]
///
/// ## Arguments
/// * 'encoding' - The encoding to classify, `None` when the runtime reported none
#[must_use]
pub fn parse_type_encoding<'a>(encoding: impl Into<Option<&'a str>>) -> EncodingType {
    parse_type_encoding_with(encoding, &EncodingOptions::default())
}

/// Classify a type encoding
///
/// ## Arguments
/// * 'encoding' - The encoding to classify, `None` when the runtime reported none
/// * 'options'  - Classifier options
#[must_use]
pub fn parse_type_encoding_with<'a>(
    encoding: impl Into<Option<&'a str>>,
    options: &EncodingOptions,
) -> EncodingType {
    match encoding.into() {
        Some(encoding) => EncodingParser::new(encoding, options).parse_type(),
        None => EncodingType::UNKNOWN,
    }
}

/// Read the class name and protocols of an `@"Class<Protocol>"` encoding
///
/// Returns `None` unless `encoding` starts with `@"`.
///
/// ## Arguments
/// * 'encoding' - The object type encoding
#[must_use]
pub fn parse_object_type(encoding: &str) -> Option<ObjectTypeRef> {
    let options = EncodingOptions::default();
    EncodingParser::new(encoding, &options).parse_object_type()
}
