//! FILENAME: dyngrid-engine/src/comparer.rs
//! Ordering strategy for distinct header keys.
//!
//! Wraps an arbitrary two-argument ordering function so header discovery can
//! sort row and column keys without knowing where the ordering came from.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type CompareFn<T> = dyn Fn(&T, &T) -> Ordering + Send + Sync;

/// A reusable, thread-safe ordering over header keys.
pub struct KeyComparer<T> {
    compare: Arc<CompareFn<T>>,
}

impl<T> KeyComparer<T> {
    /// Wraps an ordering function.
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        KeyComparer {
            compare: Arc::new(compare),
        }
    }

    /// Wraps a tri-valued comparison (negative, zero, positive).
    pub fn from_tri_valued<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> i32 + Send + Sync + 'static,
        T: 'static,
    {
        KeyComparer::new(move |a, b| compare(a, b).cmp(&0))
    }

    /// Compares two keys.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    /// Sorts keys in place. The sort is stable, so keys that compare equal
    /// keep their discovery order.
    pub fn sort(&self, keys: &mut [T]) {
        keys.sort_by(|a, b| self.compare(a, b));
    }
}

impl<T: 'static> KeyComparer<T> {
    /// The same ordering, reversed.
    pub fn reversed(&self) -> Self {
        let inner = Arc::clone(&self.compare);
        KeyComparer::new(move |a, b| inner(a, b).reverse())
    }
}

impl<T: Ord + 'static> KeyComparer<T> {
    /// The key type's own ordering.
    pub fn natural() -> Self {
        KeyComparer::new(|a: &T, b: &T| a.cmp(b))
    }
}

impl<T> Clone for KeyComparer<T> {
    fn clone(&self) -> Self {
        KeyComparer {
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for KeyComparer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyComparer(..)")
    }
}
