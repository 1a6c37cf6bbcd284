// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # objscope
//!
//! Runtime reflection over object types. Given an opaque class handle, `objscope` enumerates
//! the instance variables, methods and declared properties of the class, classifies the
//! compact type-encoding string of every member, and caches the result per class.
//!
//! ## Features
//!
//! - **🔍 Type-encoding classification** - Total, allocation-free classification of encodings
//!   such as `r^v`, `@"NSString"` or `{CGRect={CGPoint=dd}{CGSize=dd}}`
//! - **🧩 Member descriptors** - Fields, methods and properties, including the property
//!   attribute grammar (ownership, atomicity, accessors, backing variable, protocols)
//! - **⚡ Concurrent cache** - Shared class records with lazy refresh and at most one build per
//!   class under concurrent first access
//! - **🔧 Runtime agnostic** - Everything runtime specific sits behind the [`ObjectRuntime`]
//!   trait; [`runtime::TableRuntime`] provides an in-memory implementation
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust
//! use objscope::prelude::*;
//! use std::sync::Arc;
//!
//! let runtime = Arc::new(TableRuntime::new());
//! runtime.register(
//!     ClassBuilder::new("User")
//!         .field(FieldDef::new("_id", "q"))
//!         .property(PropertyDef::from_attributes("id", "Tq,N,V_id")),
//! )?;
//!
//! let cache = ClassCache::new(runtime);
//! let user = cache.try_lookup_name("User")?;
//! assert_eq!(user.fields()["_id"].encoding.kind, TypeKind::Int64);
//! assert_eq!(user.properties()["id"].setter.as_deref(), Some("setId"));
//! # Ok::<(), objscope::Error>(())
//! ```
//!
//! ### Classifying Encodings
//!
//! ```rust
//! use objscope::encoding::{parse_type_encoding, TypeKind, TypeQualifiers};
//!
//! let ty = parse_type_encoding("rn^v");
//! assert_eq!(ty.kind, TypeKind::Pointer);
//! assert_eq!(ty.qualifiers, TypeQualifiers::CONST | TypeQualifiers::IN);
//! ```
//!
//! ## Architecture
//!
//! - [`encoding`] - The type-encoding classifier
//! - [`runtime`] - The [`ObjectRuntime`] capability, handles and the table runtime
//! - [`metadata`] - Member descriptors, class records and the [`ClassCache`]
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! `objscope` logs through the [`log`](https://docs.rs/log) facade: cache builds and refreshes
//! at `debug`, member counts at `trace`, and classes that cannot be cached at `warn`. No
//! logger is installed by the library.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//!
//! # Fuzz the classifier and the property attribute grammar
//! cargo +nightly fuzz run type_encoding --release
//! ```
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use objscope::prelude::*;
///
/// let ty = parse_type_encoding("@?");
/// assert_eq!(ty.kind, TypeKind::Block);
/// ```
pub mod prelude;

pub mod encoding;

pub mod runtime;

pub mod metadata;

mod config;

/// `objscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `objscope` Error type
///
/// The error type for class lookups and runtime table definitions. Classifying an encoding
/// never fails.
pub use error::Error;

/// Configuration of a [`ClassCache`]
pub use config::{CacheConfig, DEFAULT_MAX_DEPTH};

/// The class metadata cache, the main entry point of the crate
pub use metadata::ClassCache;

/// The object runtime capability
pub use runtime::ObjectRuntime;
