//! Thread-safe cache of class metadata records.
//!
//! [`ClassCache`] builds a [`ClassInfo`] the first time a class is looked up and hands out the
//! same shared record afterwards. Records are keyed by class name, with instance-level
//! classes and meta-classes kept in separate partitions since both carry the same name.
//!
//! # Staleness
//!
//! Records never change after they are built. When a class gains or loses members, the owner
//! marks its record stale with [`ClassCache::mark_stale`]; the next lookup builds a new record
//! and replaces the cached one. Holders of the old record keep a consistent snapshot whose
//! [`ClassInfo::needs_update`] stays `true`.
//!
//! # Concurrency
//!
//! Lookups of a current record only read the partition. Building a record first resolves the
//! superclass record, with no lock held, and then constructs and inserts the new record while
//! holding the partition entry, so each name is built at most once under concurrent first
//! access and a partially built record is never observed.

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    config::CacheConfig,
    metadata::{ClassInfo, ClassInfoRc},
    runtime::{ClassHandle, ObjectRuntime},
    Error, Result,
};

/// Cache of [`ClassInfo`] records for one object runtime.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use objscope::{ClassCache, runtime::{ClassBuilder, FieldDef, TableRuntime}};
///
/// let runtime = Arc::new(TableRuntime::new());
/// let point = runtime.register(ClassBuilder::new("Point").field(FieldDef::new("x", "d")))?;
///
/// let cache = ClassCache::new(runtime.clone());
/// let first = cache.lookup(point).unwrap();
/// let second = cache.lookup_name("Point").unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
///
/// runtime.add_field(point, FieldDef::new("y", "d"))?;
/// cache.mark_stale(&first);
/// let refreshed = cache.lookup(point).unwrap();
/// assert_eq!(refreshed.fields().len(), 2);
/// assert!(first.needs_update());
/// # Ok::<(), objscope::Error>(())
/// ```
pub struct ClassCache {
    runtime: Arc<dyn ObjectRuntime>,
    config: CacheConfig,
    /// Instance-level classes, by name
    classes: DashMap<String, ClassInfoRc>,
    /// Meta-classes, by name
    metas: DashMap<String, ClassInfoRc>,
}

impl ClassCache {
    /// Create an empty cache over `runtime` with the default [`CacheConfig`]
    pub fn new(runtime: Arc<dyn ObjectRuntime>) -> Self {
        Self::with_config(runtime, CacheConfig::default())
    }

    /// Create an empty cache over `runtime`
    pub fn with_config(runtime: Arc<dyn ObjectRuntime>, config: CacheConfig) -> Self {
        ClassCache {
            runtime,
            config,
            classes: DashMap::new(),
            metas: DashMap::new(),
        }
    }

    /// The runtime this cache describes
    #[must_use]
    pub fn runtime(&self) -> &Arc<dyn ObjectRuntime> {
        &self.runtime
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The record of a class or meta-class, `None` if it cannot be described
    ///
    /// See [`ClassCache::try_lookup`] for the reasons a lookup fails.
    #[must_use]
    pub fn lookup(&self, class: ClassHandle) -> Option<ClassInfoRc> {
        self.try_lookup(class).ok()
    }

    /// The record of the class named `name`, `None` if there is no such class
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<ClassInfoRc> {
        self.try_lookup_name(name).ok()
    }

    /// The record of a class or meta-class.
    ///
    /// Returns the cached record while it is current, and builds (or rebuilds) it otherwise.
    /// A record whose superclass records went stale is rebuilt as well, so the hierarchy
    /// reachable from the result is always current at the time of the call.
    ///
    /// # Errors
    /// - [`Error::NullHandle`] for the null handle
    /// - [`Error::UnnamedClass`] if the runtime reports no name for the class. A superclass
    ///   without a name is left out of the record instead, so its `super_info` is `None`.
    /// - [`Error::RecursionLimit`] if the superclass chain is longer than
    ///   [`CacheConfig::max_depth`], whether or not its ancestors are already cached
    pub fn try_lookup(&self, class: ClassHandle) -> Result<ClassInfoRc> {
        self.resolve(class, 0)
    }

    /// The record of the class named `name`.
    ///
    /// # Errors
    /// - [`Error::ClassNotFound`] if the runtime has no class by that name
    /// - any error of [`ClassCache::try_lookup`]
    pub fn try_lookup_name(&self, name: &str) -> Result<ClassInfoRc> {
        let class = self
            .runtime
            .lookup_class(name)
            .ok_or_else(|| Error::ClassNotFound(name.to_string()))?;

        self.resolve(class, 0)
    }

    /// Flag a record, and the cached record of the same class, as out of date.
    ///
    /// Nothing is rebuilt until the next lookup.
    pub fn mark_stale(&self, info: &ClassInfo) {
        info.set_needs_update();
        if let Some(current) = self.partition(info.is_meta).get(&info.name) {
            current.set_needs_update();
        }
    }

    /// Rebuild the record of `info`'s class from a fresh enumeration of its members
    ///
    /// # Errors
    /// Any error of [`ClassCache::try_lookup`]
    pub fn refresh(&self, info: &ClassInfo) -> Result<ClassInfoRc> {
        self.mark_stale(info);
        self.resolve(info.class, 0)
    }

    /// Build the records of the named classes in parallel.
    ///
    /// Returns how many of the names resolved to a record.
    pub fn preload(&self, names: &[&str]) -> usize {
        names
            .par_iter()
            .filter(|name| self.try_lookup_name(name).is_ok())
            .count()
    }

    /// Returns true if a record of `class` is cached, current or not
    #[must_use]
    pub fn contains(&self, class: ClassHandle) -> bool {
        self.runtime
            .class_name(class)
            .is_some_and(|name| {
                self.partition(self.runtime.is_meta_class(class))
                    .contains_key(&name)
            })
    }

    /// The number of cached records, meta-classes included
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len() + self.metas.len()
    }

    /// Returns true if nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.metas.is_empty()
    }

    /// Drop every cached record
    pub fn clear(&self) {
        self.classes.clear();
        self.metas.clear();
    }

    fn partition(&self, is_meta: bool) -> &DashMap<String, ClassInfoRc> {
        if is_meta {
            &self.metas
        } else {
            &self.classes
        }
    }

    fn resolve(&self, class: ClassHandle, depth: usize) -> Result<ClassInfoRc> {
        let class = class.non_null().ok_or(Error::NullHandle)?;

        if depth >= self.config.max_depth {
            warn!(
                "superclass chain of {} exceeds {} classes",
                class, self.config.max_depth
            );
            return Err(Error::RecursionLimit(self.config.max_depth));
        }

        let Some(name) = self.runtime.class_name(class).filter(|name| !name.is_empty()) else {
            warn!("class {} has no name and cannot be cached", class);
            return Err(Error::UnnamedClass(class));
        };
        let is_meta = self.runtime.is_meta_class(class);
        let partition = self.partition(is_meta);

        if let Some(info) = partition.get(&name) {
            if is_current(&info) {
                return Ok(info.clone());
            }
        }

        // Resolved outside the entry, the superclass may live in the same shard
        let super_info = match self.runtime.superclass(class) {
            Some(superclass) => match self.resolve(superclass, depth + 1) {
                Ok(info) => Some(info),
                Err(Error::UnnamedClass(_) | Error::NullHandle) => {
                    warn!(
                        "superclass {} of {} cannot be described, recording {} without it",
                        superclass, name, name
                    );
                    None
                }
                Err(error) => return Err(error),
            },
            None => None,
        };

        // Cached ancestors skip the recursion above, so bound the linked chain as well
        let chain = super_info.as_ref().map_or(0, |info| info.hierarchy().count()) + 1;
        if chain > self.config.max_depth {
            warn!(
                "superclass chain of {} has {} classes, more than {}",
                name, chain, self.config.max_depth
            );
            return Err(Error::RecursionLimit(self.config.max_depth));
        }

        match partition.entry(name) {
            Entry::Occupied(mut entry) => {
                if is_current(entry.get()) {
                    return Ok(entry.get().clone());
                }

                let info = Arc::new(ClassInfo::new(
                    self.runtime.as_ref(),
                    class,
                    super_info,
                    &self.config,
                )?);
                debug!("refreshed {} record of {}", kind(is_meta), info.name);
                entry.insert(info.clone());
                Ok(info)
            }
            Entry::Vacant(entry) => {
                debug!("building {} record of {}", kind(is_meta), entry.key());
                let info = Arc::new(ClassInfo::new(
                    self.runtime.as_ref(),
                    class,
                    super_info,
                    &self.config,
                )?);
                entry.insert(info.clone());
                Ok(info)
            }
        }
    }
}

/// A record is current while neither it nor any superclass record is stale
fn is_current(info: &ClassInfo) -> bool {
    !info.hierarchy().any(ClassInfo::needs_update)
}

fn kind(is_meta: bool) -> &'static str {
    if is_meta {
        "meta-class"
    } else {
        "class"
    }
}
