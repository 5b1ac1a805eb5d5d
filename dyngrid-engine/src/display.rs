//! FILENAME: dyngrid-engine/src/display.rs
//! Display Synthesis - Turns the cache and the current window into cells.
//!
//! Called on every scroll tick, resize and finished rebuild. The decision,
//! in order:
//! 1. Busy, no data, or no matrix: drop the visible set.
//! 2. Same shape, same offsets, no force: do nothing.
//! 3. Shape changed (or nothing shown yet): allocate new collections.
//! 4. Otherwise: keep the collections and overwrite their contents.
//!
//! Recycling keeps every `DataCell` where it is, so a pure scroll costs one
//! matrix lookup per visible cell and no allocation.

use crate::cache::ContentMatrix;
use crate::definition::GridKey;
use crate::headers::HeaderCache;
use crate::log_debug;
use crate::view::{
    DataCell, DisplayUpdate, GridColumn, GridHeader, GridRow, HeaderContent, VisibleCellSet,
};
use crate::window::GridWindow;

/// What the synthesizer reads. Both caches are absent before the first pass
/// and after a cleared source.
pub struct DisplayInput<'a, R, TRow, TCol, A> {
    pub busy: bool,
    pub headers: Option<&'a HeaderCache<TRow, TCol>>,
    pub matrix: Option<&'a ContentMatrix<R, A>>,
    pub window: GridWindow,
    pub force_update: bool,
}

#[derive(Debug)]
pub struct DisplaySynthesizer<R, TRow, TCol, A> {
    visible: Option<VisibleCellSet<R, TRow, TCol, A>>,

    /// (rows, columns) of the last synthesized window.
    displayed_shape: (usize, usize),

    /// (row offset, column offset) of the last synthesized window.
    displayed_offsets: (usize, usize),

    generation: u64,
}

impl<R, TRow, TCol, A> DisplaySynthesizer<R, TRow, TCol, A>
where
    R: Clone,
    A: Clone,
    TRow: GridKey,
    TCol: GridKey,
{
    pub fn new() -> Self {
        DisplaySynthesizer {
            visible: None,
            displayed_shape: (0, 0),
            displayed_offsets: (0, 0),
            generation: 0,
        }
    }

    pub fn visible(&self) -> Option<&VisibleCellSet<R, TRow, TCol, A>> {
        self.visible.as_ref()
    }

    pub fn clear(&mut self) {
        self.visible = None;
    }

    pub fn synthesize(&mut self, input: DisplayInput<'_, R, TRow, TCol, A>) -> DisplayUpdate {
        let (headers, matrix) = match (input.headers, input.matrix) {
            (Some(h), Some(m)) if !input.busy && !h.is_empty() && !m.is_empty() => (h, m),
            _ => {
                if self.visible.take().is_some() {
                    log_debug!("DISPLAY", "cleared (busy={})", input.busy);
                }
                return DisplayUpdate::Cleared;
            }
        };

        let shape = input.window.shape();
        let offsets = input.window.offsets();
        let shape_changed = self.visible.is_none() || shape != self.displayed_shape;

        if !shape_changed && offsets == self.displayed_offsets && !input.force_update {
            return DisplayUpdate::Unchanged;
        }

        let update = match self.visible.as_mut() {
            Some(set) if !shape_changed => {
                recycle(set, headers, matrix, &input.window);
                DisplayUpdate::Recycled
            }
            _ => {
                self.generation += 1;
                self.visible = Some(regenerate(headers, matrix, &input.window, self.generation));
                DisplayUpdate::Regenerated
            }
        };

        log_debug!(
            "DISPLAY",
            "{:?} {}x{} at row {} col {} (gen {})",
            update,
            shape.0,
            shape.1,
            offsets.0,
            offsets.1,
            self.generation
        );

        self.displayed_shape = shape;
        self.displayed_offsets = offsets;
        update
    }
}

impl<R, TRow, TCol, A> Default for DisplaySynthesizer<R, TRow, TCol, A>
where
    R: Clone,
    A: Clone,
    TRow: GridKey,
    TCol: GridKey,
{
    fn default() -> Self {
        DisplaySynthesizer::new()
    }
}

// ============================================================================
// REGENERATE / RECYCLE
// ============================================================================

fn regenerate<R, TRow, TCol, A>(
    headers: &HeaderCache<TRow, TCol>,
    matrix: &ContentMatrix<R, A>,
    window: &GridWindow,
    generation: u64,
) -> VisibleCellSet<R, TRow, TCol, A>
where
    R: Clone,
    A: Clone,
    TRow: GridKey,
    TCol: GridKey,
{
    let (rows, columns) = window.shape();
    let (row_offset, col_offset) = window.offsets();

    let mut data_cells = Vec::with_capacity(rows * columns);
    for r in 0..rows {
        for c in 0..columns {
            data_cells.push(DataCell {
                row: r + 1,
                column: c + 1,
                content: matrix.cell(col_offset + c, row_offset + r),
            });
        }
    }

    let mut header_cells = Vec::with_capacity(1 + rows + columns);
    header_cells.push(GridHeader::corner());
    let row_keys = headers.rows.keys().iter().skip(row_offset).take(rows);
    header_cells.extend(row_keys.enumerate().map(|(i, key)| GridHeader::for_row(i + 1, key.clone())));
    let column_keys = headers.columns.keys().iter().skip(col_offset).take(columns);
    header_cells.extend(column_keys.enumerate().map(|(i, key)| GridHeader::for_column(i + 1, key.clone())));

    VisibleCellSet {
        data_cells,
        rows: (1..=rows).map(GridRow::new).collect(),
        columns: (1..=columns).map(GridColumn::new).collect(),
        headers: header_cells,
        generation,
    }
}

fn recycle<R, TRow, TCol, A>(
    set: &mut VisibleCellSet<R, TRow, TCol, A>,
    headers: &HeaderCache<TRow, TCol>,
    matrix: &ContentMatrix<R, A>,
    window: &GridWindow,
) where
    R: Clone,
    A: Clone,
    TRow: GridKey,
    TCol: GridKey,
{
    let (rows, _) = window.shape();
    let (row_offset, col_offset) = window.offsets();

    for cell in set.data_cells.iter_mut() {
        cell.content = matrix.cell(col_offset + cell.column - 1, row_offset + cell.row - 1);
    }

    // Header slots keep their position: row header r at index r, column
    // header c at index rows + c.
    for header in set.headers.iter_mut().skip(1) {
        header.content = if header.column == 0 {
            match headers.rows.get(row_offset + header.row - 1) {
                Some(key) => HeaderContent::Row(key.clone()),
                None => continue,
            }
        } else {
            match headers.columns.get(col_offset + header.column - 1) {
                Some(key) => HeaderContent::Column(key.clone()),
                None => continue,
            }
        };
    }
    debug_assert_eq!(set.headers.len(), 1 + rows + set.columns.len());
}
