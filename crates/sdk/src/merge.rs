//! Typed deep merge.
//!
//! Precedence is declared per type rather than inferred from object layout:
//!
//! - leaf values (strings, booleans, numbers, enums) are replaced by the overlay;
//! - `Option<T>` keeps the base when the overlay is `None`, and merges when both
//!   sides are present;
//! - `Vec<T>` is replaced wholesale;
//! - `BTreeMap<K, V>` is merged key by key, recursing into shared keys.
//!
//! Records implement [`Merge`] field by field using these building blocks.

use std::collections::BTreeMap;

/// Combine `self` (the base) with an overlay whose values take precedence.
pub trait Merge {
    fn merge(self, overlay: Self) -> Self;
}

macro_rules! replace_on_merge {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Merge for $ty {
                fn merge(self, overlay: Self) -> Self {
                    overlay
                }
            }
        )*
    };
}

replace_on_merge!(String, bool, i64, u32, f64);

impl<T: Merge> Merge for Option<T> {
    fn merge(self, overlay: Self) -> Self {
        match (self, overlay) {
            (Some(base), Some(overlay)) => Some(base.merge(overlay)),
            (base, overlay) => overlay.or(base),
        }
    }
}

impl<T> Merge for Vec<T> {
    fn merge(self, overlay: Self) -> Self {
        overlay
    }
}

impl<T: Merge> Merge for Box<T> {
    fn merge(self, overlay: Self) -> Self {
        Box::new((*self).merge(*overlay))
    }
}

impl<K: Ord, V: Merge> Merge for BTreeMap<K, V> {
    fn merge(mut self, overlay: Self) -> Self {
        for (key, value) in overlay {
            let merged = match self.remove(&key) {
                Some(base) => base.merge(value),
                None => value,
            };
            self.insert(key, merged);
        }
        self
    }
}
