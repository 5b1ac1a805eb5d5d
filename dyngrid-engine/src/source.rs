//! FILENAME: dyngrid-engine/src/source.rs
//! PURPOSE: The record collection the grid is built from.
//! CONTEXT: Records live behind an `Arc` so a rebuild pass can hold a
//! snapshot while the host keeps editing. Mutating while a snapshot is alive
//! copies the vector once (`Arc::make_mut`), so both stages of a pass always
//! read the same records.

use std::sync::Arc;

/// What a single mutation did to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceChange {
    Insert { index: usize },
    Remove { index: usize },
    Replace { index: usize },
    Reset { len: usize },
}

#[derive(Debug, Clone)]
pub struct RecordSource<R> {
    records: Arc<Vec<R>>,

    /// Bumped on every mutation; the grid compares versions to decide
    /// whether a batch of edits needs a data-changed signal.
    version: u64,

    last_change: Option<SourceChange>,
}

impl<R: Clone> RecordSource<R> {
    pub fn new(records: Vec<R>) -> Self {
        RecordSource {
            records: Arc::new(records),
            version: 0,
            last_change: None,
        }
    }

    /// Shared, immutable view of the current records.
    pub fn snapshot(&self) -> Arc<Vec<R>> {
        Arc::clone(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_change(&self) -> Option<SourceChange> {
        self.last_change
    }

    pub fn push(&mut self, record: R) -> SourceChange {
        let index = self.records.len();
        Arc::make_mut(&mut self.records).push(record);
        self.changed(SourceChange::Insert { index })
    }

    /// Inserts at `index`, clamped to the current length.
    pub fn insert(&mut self, index: usize, record: R) -> SourceChange {
        let index = index.min(self.records.len());
        Arc::make_mut(&mut self.records).insert(index, record);
        self.changed(SourceChange::Insert { index })
    }

    /// Removes the record at `index`. Out-of-range indices change nothing.
    pub fn remove(&mut self, index: usize) -> Option<R> {
        if index >= self.records.len() {
            return None;
        }
        let removed = Arc::make_mut(&mut self.records).remove(index);
        self.changed(SourceChange::Remove { index });
        Some(removed)
    }

    /// Replaces the record at `index`, returning the old one.
    pub fn replace(&mut self, index: usize, record: R) -> Option<R> {
        let slot = Arc::make_mut(&mut self.records).get_mut(index)?;
        let old = std::mem::replace(slot, record);
        self.changed(SourceChange::Replace { index });
        Some(old)
    }

    /// Swaps in a whole new record set.
    pub fn reset(&mut self, records: Vec<R>) -> SourceChange {
        let len = records.len();
        self.records = Arc::new(records);
        self.changed(SourceChange::Reset { len })
    }

    pub fn clear(&mut self) -> SourceChange {
        self.reset(Vec::new())
    }

    /// Keeps only the records matching `keep`.
    pub fn retain<F>(&mut self, keep: F) -> SourceChange
    where
        F: FnMut(&R) -> bool,
    {
        Arc::make_mut(&mut self.records).retain(keep);
        let len = self.records.len();
        self.changed(SourceChange::Reset { len })
    }

    fn changed(&mut self, change: SourceChange) -> SourceChange {
        self.version += 1;
        self.last_change = Some(change);
        change
    }
}

impl<R: Clone> Default for RecordSource<R> {
    fn default() -> Self {
        RecordSource::new(Vec::new())
    }
}
