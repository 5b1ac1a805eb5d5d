//! FILENAME: dyngrid-engine/src/headers.rs
//! Header Discovery - Distinct row and column keys derived from the data.
//!
//! The grid has no fixed schema: its rows and columns are whatever distinct
//! keys the selectors produce. Discovery runs once per rebuild pass:
//! - Every record is mapped through the selector
//! - Keys are deduplicated by equality, first-seen order preserved
//! - If a comparer is configured, keys are stably sorted by it
//! - Each key gets its position in the final order (key -> index)
//!
//! Row and column discovery share nothing and run concurrently.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::comparer::KeyComparer;
use crate::definition::{GridDefinition, GridKey};
use crate::parallel;

// ============================================================================
// KEY INDEX
// ============================================================================

/// Distinct keys of one axis in display order, plus the reverse lookup.
#[derive(Debug, Clone)]
pub struct KeyIndex<K> {
    /// Keys in display order. Never contains duplicates.
    keys: Vec<K>,

    /// Position of every key in `keys`.
    positions: FxHashMap<K, usize>,
}

impl<K: GridKey> KeyIndex<K> {
    pub fn empty() -> Self {
        KeyIndex {
            keys: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// Builds the index from keys in discovery order.
    pub fn from_keys<I>(keys: I, comparer: Option<&KeyComparer<K>>) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut distinct = Vec::new();
        let mut positions = FxHashMap::default();

        for key in keys {
            if let Entry::Vacant(slot) = positions.entry(key) {
                distinct.push(slot.key().clone());
                slot.insert(distinct.len() - 1);
            }
        }

        if let Some(comparer) = comparer {
            comparer.sort(&mut distinct);
            for (i, key) in distinct.iter().enumerate() {
                if let Some(pos) = positions.get_mut(key) {
                    *pos = i;
                }
            }
        }

        KeyIndex {
            keys: distinct,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position of a key, if it was discovered.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn get(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.keys.iter()
    }
}

impl<K: GridKey> Default for KeyIndex<K> {
    fn default() -> Self {
        KeyIndex::empty()
    }
}

// ============================================================================
// HEADER CACHE
// ============================================================================

/// Result of one discovery pass: both axes.
#[derive(Debug, Clone)]
pub struct HeaderCache<TRow, TCol> {
    pub rows: KeyIndex<TRow>,
    pub columns: KeyIndex<TCol>,
}

impl<TRow: GridKey, TCol: GridKey> HeaderCache<TRow, TCol> {
    pub fn empty() -> Self {
        HeaderCache {
            rows: KeyIndex::empty(),
            columns: KeyIndex::empty(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }
}

/// Discovers the distinct keys of a single axis.
pub fn discover_axis<R, K>(
    records: &[R],
    selector: &(dyn Fn(&R) -> K + Send + Sync),
    comparer: Option<&KeyComparer<K>>,
) -> KeyIndex<K>
where
    K: GridKey,
{
    KeyIndex::from_keys(records.iter().map(selector), comparer)
}

/// Discovers row and column keys concurrently.
/// An empty record slice yields two empty axes.
pub fn discover_headers<R, TRow, TCol, A>(
    records: &[R],
    definition: &GridDefinition<R, TRow, TCol, A>,
) -> HeaderCache<TRow, TCol>
where
    R: Sync,
    TRow: GridKey,
    TCol: GridKey,
{
    if records.is_empty() {
        return HeaderCache::empty();
    }

    let row_selector = definition.row_selector.as_ref();
    let column_selector = definition.column_selector.as_ref();
    let row_comparer = definition.row_comparer.as_ref();
    let column_comparer = definition.column_comparer.as_ref();

    let (rows, columns) = parallel::join(
        || discover_axis(records, row_selector, row_comparer),
        || discover_axis(records, column_selector, column_comparer),
    );

    HeaderCache { rows, columns }
}
