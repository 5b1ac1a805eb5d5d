//! FILENAME: dyngrid-engine/src/cache.rs
//! Grid Cache - Dense content matrix built from the discovered headers.
//!
//! The cache is designed for:
//! - O(n) build from the record snapshot (n = records)
//! - O(1) lookup of any (column, row) position while scrolling
//! - Zero aggregation cost for cells hit by a single record
//!
//! Architecture:
//! - One flat, row-major buffer of `column_count * row_count` cells
//! - Records are first placed by index; colliding indices are collected
//! - Each colliding cell is reduced exactly once, after every record is placed
//! - A finished matrix is never mutated; a rebuild allocates a new one

use std::time::Instant;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::definition::{GridDefinition, GridKey};
use crate::error::GridError;
use crate::headers::HeaderCache;
use crate::log_debug;

// ============================================================================
// CELL CONTENT
// ============================================================================

/// Content of one (row key, column key) position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridCell<R, A> {
    /// No record maps to this position.
    Empty,
    /// Exactly one record maps here; stored as-is.
    Single(R),
    /// Two or more records collided; this is the aggregator's result.
    Aggregated(A),
}

impl<R, A> GridCell<R, A> {
    pub fn is_empty(&self) -> bool {
        matches!(self, GridCell::Empty)
    }

    pub fn as_single(&self) -> Option<&R> {
        match self {
            GridCell::Single(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_aggregated(&self) -> Option<&A> {
        match self {
            GridCell::Aggregated(value) => Some(value),
            _ => None,
        }
    }
}

impl<R, A> Default for GridCell<R, A> {
    fn default() -> Self {
        GridCell::Empty
    }
}

/// Placement state of a position while records are being distributed.
/// Holds record indices into the snapshot, never the records themselves.
#[derive(Debug, Clone)]
enum Slot {
    Empty,
    Single(usize),
    Colliding(SmallVec<[usize; 4]>),
}

// ============================================================================
// MATRIX
// ============================================================================

/// Statistics about the last build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixStats {
    pub record_count: usize,
    pub occupied_cells: usize,
    pub aggregated_cells: usize,
    pub build_time_ms: u64,
}

/// Dense 2-D content store, addressed `[column, row]`.
#[derive(Debug, Clone)]
pub struct ContentMatrix<R, A> {
    /// Row-major: the cell at (column, row) lives at `row * column_count + column`.
    cells: Vec<GridCell<R, A>>,
    column_count: usize,
    row_count: usize,
    stats: MatrixStats,
}

impl<R, A> ContentMatrix<R, A> {
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn stats(&self) -> &MatrixStats {
        &self.stats
    }

    /// Content at (column, row). `None` outside the matrix.
    pub fn get(&self, column: usize, row: usize) -> Option<&GridCell<R, A>> {
        if column >= self.column_count || row >= self.row_count {
            return None;
        }
        self.cells.get(row * self.column_count + column)
    }
}

impl<R: Clone, A: Clone> ContentMatrix<R, A> {
    /// Owned copy of the content at (column, row); `Empty` outside the matrix.
    pub fn cell(&self, column: usize, row: usize) -> GridCell<R, A> {
        self.get(column, row).cloned().unwrap_or(GridCell::Empty)
    }
}

/// Places every record into a fresh matrix sized by `headers`.
///
/// Colliding records are handed to the aggregator once per cell, as one
/// complete group. A record whose key is missing from `headers` means
/// discovery and build saw different data, which is reported rather than
/// written to a wrong position.
pub fn build_content_matrix<R, TRow, TCol, A>(
    records: &[R],
    headers: &HeaderCache<TRow, TCol>,
    definition: &GridDefinition<R, TRow, TCol, A>,
) -> Result<ContentMatrix<R, A>, GridError>
where
    R: Clone,
    TRow: GridKey,
    TCol: GridKey,
{
    let started = Instant::now();
    let column_count = headers.column_count();
    let row_count = headers.row_count();

    let mut slots = vec![Slot::Empty; column_count * row_count];
    let mut occupied_cells = 0;
    let mut aggregated_cells = 0;

    for (record_index, record) in records.iter().enumerate() {
        let row = headers
            .rows
            .position(&definition.row_key(record))
            .ok_or(GridError::UnknownRowKey { record_index })?;
        let column = headers
            .columns
            .position(&definition.column_key(record))
            .ok_or(GridError::UnknownColumnKey { record_index })?;

        let slot = &mut slots[row * column_count + column];
        match slot {
            Slot::Empty => {
                *slot = Slot::Single(record_index);
                occupied_cells += 1;
            }
            Slot::Single(first) => {
                let first = *first;
                *slot = Slot::Colliding(smallvec![first, record_index]);
                aggregated_cells += 1;
            }
            Slot::Colliding(indices) => indices.push(record_index),
        }
    }

    let cells = slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Empty => GridCell::Empty,
            Slot::Single(index) => GridCell::Single(records[index].clone()),
            Slot::Colliding(indices) => {
                let group: SmallVec<[&R; 4]> = indices.iter().map(|&i| &records[i]).collect();
                GridCell::Aggregated(definition.aggregate(&group))
            }
        })
        .collect();

    let stats = MatrixStats {
        record_count: records.len(),
        occupied_cells,
        aggregated_cells,
        build_time_ms: started.elapsed().as_millis() as u64,
    };

    log_debug!(
        "CACHE",
        "matrix {}x{} built from {} records: {} occupied, {} aggregated, {}ms",
        column_count,
        row_count,
        stats.record_count,
        stats.occupied_cells,
        stats.aggregated_cells,
        stats.build_time_ms
    );

    Ok(ContentMatrix {
        cells,
        column_count,
        row_count,
        stats,
    })
}
