//! FILENAME: dyngrid-engine/src/view.rs
//! Grid View - Renderable output for the host.
//!
//! Positions are 1-based within the visible window. Position 0 is reserved
//! for headers: a row header sits at (row, 0), a column header at (0, column)
//! and the corner at (0, 0).

use serde::{Deserialize, Serialize};

use crate::cache::GridCell;

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// One visible data cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCell<R, A> {
    pub row: usize,
    pub column: usize,
    pub content: GridCell<R, A>,
}

/// Row separator, used for zebra striping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    pub row: usize,
    pub is_odd: bool,
}

impl GridRow {
    pub fn new(row: usize) -> Self {
        GridRow { row, is_odd: row % 2 == 1 }
    }
}

/// Column separator, used for zebra striping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridColumn {
    pub column: usize,
    pub is_odd: bool,
}

impl GridColumn {
    pub fn new(column: usize) -> Self {
        GridColumn { column, is_odd: column % 2 == 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeaderContent<TRow, TCol> {
    /// The top-left cell. Carries no key.
    Corner,
    Row(TRow),
    Column(TCol),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridHeader<TRow, TCol> {
    pub row: usize,
    pub column: usize,
    pub content: HeaderContent<TRow, TCol>,
}

impl<TRow, TCol> GridHeader<TRow, TCol> {
    pub fn corner() -> Self {
        GridHeader { row: 0, column: 0, content: HeaderContent::Corner }
    }

    pub fn for_row(row: usize, key: TRow) -> Self {
        GridHeader { row, column: 0, content: HeaderContent::Row(key) }
    }

    pub fn for_column(column: usize, key: TCol) -> Self {
        GridHeader { row: 0, column, content: HeaderContent::Column(key) }
    }

    pub fn is_corner(&self) -> bool {
        self.row == 0 && self.column == 0
    }
}

// ============================================================================
// VISIBLE CELL SET
// ============================================================================

/// Everything the host needs to draw the current window.
///
/// Layout of the collections, for a window of `rows x columns`:
/// - `data_cells`: row-major, `(row - 1) * columns + (column - 1)`
/// - `rows` / `columns`: one separator per local index, in order
/// - `headers`: corner first, then every row header, then every column header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleCellSet<R, TRow, TCol, A> {
    pub(crate) data_cells: Vec<DataCell<R, A>>,
    pub(crate) rows: Vec<GridRow>,
    pub(crate) columns: Vec<GridColumn>,
    pub(crate) headers: Vec<GridHeader<TRow, TCol>>,

    /// Bumped whenever the collections are replaced rather than recycled.
    pub(crate) generation: u64,
}

impl<R, TRow, TCol, A> VisibleCellSet<R, TRow, TCol, A> {
    pub fn data_cells(&self) -> &[DataCell<R, A>] {
        &self.data_cells
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    pub fn headers(&self) -> &[GridHeader<TRow, TCol>] {
        &self.headers
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Data cell at a 1-based local position.
    pub fn cell(&self, row: usize, column: usize) -> Option<&DataCell<R, A>> {
        if row == 0 || column == 0 || row > self.row_count() || column > self.column_count() {
            return None;
        }
        self.data_cells.get((row - 1) * self.column_count() + (column - 1))
    }

    pub fn corner(&self) -> Option<&GridHeader<TRow, TCol>> {
        self.headers.first().filter(|h| h.is_corner())
    }

    /// Row header at a 1-based local row.
    pub fn row_header(&self, row: usize) -> Option<&TRow> {
        if row == 0 || row > self.row_count() {
            return None;
        }
        match self.headers.get(row).map(|h| &h.content) {
            Some(HeaderContent::Row(key)) => Some(key),
            _ => None,
        }
    }

    /// Column header at a 1-based local column.
    pub fn column_header(&self, column: usize) -> Option<&TCol> {
        if column == 0 || column > self.column_count() {
            return None;
        }
        match self.headers.get(self.row_count() + column).map(|h| &h.content) {
            Some(HeaderContent::Column(key)) => Some(key),
            _ => None,
        }
    }
}

/// What a synthesis call did to the visible cell set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayUpdate {
    /// Nothing to show (busy, or no data). The set was dropped.
    Cleared,
    /// Same window, no forced refresh: nothing touched.
    Unchanged,
    /// Window shape changed: new collections were allocated.
    Regenerated,
    /// Same shape, new offsets or forced refresh: contents swapped in place.
    Recycled,
}

impl DisplayUpdate {
    /// Whether the host has anything new to draw.
    pub fn is_changed(&self) -> bool {
        !matches!(self, DisplayUpdate::Unchanged)
    }
}
