//! Key projection and ordering configuration for the tree.

use std::cmp::Ordering;

/// Three-way comparison deciding every key decision in the tree.
///
/// An implementation must be a strict weak order (irreflexive, transitive,
/// with transitive equivalence). The tree never checks this; a comparator
/// violating it loses the ordering guarantees but stays memory-safe.
pub trait Comparator<K> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Comparator delegating to the key's `Ord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Extracts the comparison key from a stored value.
pub trait KeyOf<V> {
    type Key;

    fn key(value: &V) -> &Self::Key;
}

/// Whole-value keys: the tree behaves as an ordered set.
pub struct Identity;

impl<V> KeyOf<V> for Identity {
    type Key = V;

    fn key(value: &V) -> &V {
        value
    }
}

/// First-of-pair keys: the tree behaves as an ordered map over `(K, D)`.
pub struct SelectFirst;

impl<K, D> KeyOf<(K, D)> for SelectFirst {
    type Key = K;

    fn key(value: &(K, D)) -> &K {
        &value.0
    }
}
