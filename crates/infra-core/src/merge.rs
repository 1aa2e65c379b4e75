//! Defaults-merge policy for typed resource properties
//!
//! Every props struct in this crate is made of optional fields. Merging a
//! default instance with a caller instance keeps the caller's value for each
//! field it sets and the default for everything else. Fields that need a
//! different rule (the function environment map) are listed separately when
//! the impl is generated.

use std::collections::BTreeMap;

/// Combine organisation defaults with caller-supplied values
pub trait Merge: Sized {
    /// Merge `overrides` on top of `self`, override winning per field
    fn merge(self, overrides: Self) -> Self;
}

impl<T: Merge> Merge for Option<T> {
    fn merge(self, overrides: Self) -> Self {
        match (self, overrides) {
            (Some(defaults), Some(overrides)) => Some(defaults.merge(overrides)),
            (defaults, overrides) => overrides.or(defaults),
        }
    }
}

/// Build the final configuration from defaults and caller overrides
pub fn build_config<T: Merge>(defaults: T, overrides: T) -> T {
    defaults.merge(overrides)
}

/// Merge environment variables, caller winning per variable
pub fn merge_environment(
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults;
    merged.extend(overrides);
    merged
}

/// Implement [`Merge`] for a struct of `Option` fields
///
/// Fields listed after `maps` are `BTreeMap<String, String>` and are merged
/// key by key with [`merge_environment`].
macro_rules! impl_merge {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        $crate::merge::impl_merge!($ty { $($field),* } maps {});
    };
    ($ty:ty { $($field:ident),* $(,)? } maps { $($map:ident),* $(,)? }) => {
        impl $crate::merge::Merge for $ty {
            fn merge(self, overrides: Self) -> Self {
                Self {
                    $($field: overrides.$field.or(self.$field),)*
                    $($map: $crate::merge::merge_environment(self.$map, overrides.$map),)*
                }
            }
        }
    };
}

pub(crate) use impl_merge;
