use indexmap::IndexMap;
use std::hash::Hash;

pub trait Combine {
    /// Combine two values, preferring the values in `self`.
    ///
    /// Scalars set in `self` win. Lists set in `self` replace those in `other`
    /// rather than being joined, since a module list is ordered and must be
    /// taken as a whole. Tables are merged key by key.
    #[must_use]
    fn combine(self, other: Self) -> Self;
}

impl<T> Combine for Option<T> {
    fn combine(self, other: Self) -> Self {
        self.or(other)
    }
}

impl Combine for Vec<String> {
    fn combine(self, other: Self) -> Self {
        if self.is_empty() { other } else { self }
    }
}

impl<K: Hash + Eq, V> Combine for IndexMap<K, V> {
    fn combine(self, mut other: Self) -> Self {
        // Keep the lower layer's ordering for shared keys, append new ones
        other.extend(self);
        other
    }
}
