/// Helper macro for reading locked items
///
/// A poisoned lock only means another thread panicked while holding it; the member lists
/// guarded here stay structurally valid, so the guard is recovered instead of propagated.
///
/// ```rust, ignore
///  let methods = read_lock!(entry.methods);
///  println!("{}", methods.len());
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  let mut methods = write_lock!(entry.methods);
///  methods.push(handle);
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Helper macro for writing to locked items through a closure
///
/// ```rust, ignore
///  with_write!(entry.methods, |methods: &mut Vec<MethodHandle>| methods.clear());
/// ```
macro_rules! with_write {
    ($rwlock:expr, $closure:expr) => {{
        let mut guard = write_lock!($rwlock);
        $closure(&mut *guard)
    }};
}

/// Defines an opaque runtime handle.
///
/// Every handle is a `Copy` newtype over a `u64` where the value `0` is reserved for the
/// null handle, mirroring the nil pointers an object runtime hands out.
///
/// ```rust, ignore
/// define_handle! {
///     /// Opaque class reference
///     ClassHandle
/// }
/// ```
macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            /// The null handle
            pub const NULL: $name = $name(0);

            /// Creates a new handle from a raw value
            #[must_use]
            pub const fn new(value: u64) -> Self {
                $name(value)
            }

            /// Returns the raw handle value
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }

            /// Returns true if this is the null handle (value 0)
            #[must_use]
            pub const fn is_null(&self) -> bool {
                self.0 == 0
            }

            /// Returns `None` for the null handle, `Some(self)` otherwise
            #[must_use]
            pub const fn non_null(self) -> Option<Self> {
                if self.0 == 0 {
                    None
                } else {
                    Some(self)
                }
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }

        impl From<$name> for u64 {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "(0x{:x})"), self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0x{:x}", self.0)
            }
        }
    };
}
