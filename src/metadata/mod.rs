//! Member descriptors and class metadata.
//!
//! This module holds everything that is built from runtime handles:
//!
//! - [`FieldInfo`] - an instance variable with its classified type
//! - [`MethodInfo`] - a method with its selector, implementation and argument encodings
//! - [`PropertyInfo`] - a declared property with its decoded attribute list
//! - [`ClassInfo`] - all members a class declares, linked to its superclass record
//! - [`ClassCache`] - shared, lazily refreshed [`ClassInfo`] records keyed by class name
//!
//! Descriptors are built once from a handle and never change. A class that changes at run
//! time gets a new [`ClassInfo`] through the cache.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use objscope::{
//!     encoding::TypeKind,
//!     metadata::ClassCache,
//!     runtime::{ClassBuilder, PropertyDef, TableRuntime},
//! };
//!
//! let runtime = Arc::new(TableRuntime::new());
//! runtime.register(
//!     ClassBuilder::new("Account")
//!         .property(PropertyDef::from_attributes("balance", "Td,R,N,V_balance")),
//! )?;
//!
//! let cache = ClassCache::new(runtime);
//! let account = cache.try_lookup_name("Account")?;
//! let balance = &account.properties()["balance"];
//!
//! assert_eq!(balance.encoding.kind, TypeKind::Double);
//! assert!(balance.is_readonly());
//! assert_eq!(balance.ivar_name.as_deref(), Some("_balance"));
//! # Ok::<(), objscope::Error>(())
//! ```

mod cache;
mod class;
mod field;
mod method;
mod property;

pub use cache::ClassCache;
pub use class::{ClassInfo, ClassInfoRc, ClassMembers};
pub use field::FieldInfo;
pub use method::MethodInfo;
pub use property::{parse_attribute_string, PropertyInfo};
