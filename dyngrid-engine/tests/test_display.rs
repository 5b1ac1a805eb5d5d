//! FILENAME: tests/test_display.rs
//! Integration tests for windowing, scrolling and visible cell synthesis.

mod common;

use std::time::{Duration, Instant};

use common::{idle_grid, product_name, production_data, production_definition, ProductionGrid};
use dyngrid_engine::{DisplayUpdate, DynamicGrid, GridCell, HeaderContent};

fn count_at(grid: &ProductionGrid, row: usize, column: usize) -> i64 {
    let set = grid.visible_cells().unwrap();
    match &set.cell(row, column).unwrap().content {
        GridCell::Single(record) => record.count,
        GridCell::Aggregated(sum) => *sum,
        GridCell::Empty => panic!("empty cell at ({}, {})", row, column),
    }
}

// ============================================================================
// WINDOWING
// ============================================================================

#[test]
fn test_window_clamped_at_end_of_data() {
    let mut grid = idle_grid(5, 5);
    grid.set_scroll_offset(1000.0, 1000.0, Instant::now());

    let window = grid.window();
    assert_eq!(window.rows.capacity, 4);
    assert_eq!(window.rows.offset, 1);
    assert_eq!(window.rows.visible_count, 4);
    assert_eq!(window.columns.offset, 1);
    assert_eq!(count_at(&grid, 4, 4), 4004);
}

#[test]
fn test_counts_and_extent() {
    let grid = idle_grid(9, 4);
    assert_eq!(grid.row_count(), 4);
    assert_eq!(grid.column_count(), 4);

    let extent = grid.logical_extent();
    assert_eq!(extent.height, 1000.0);
    assert_eq!(extent.width, 500.0);
    assert!(grid.scroll_state().can_scroll_vertically());
}

#[test]
fn test_small_data_shows_everything() {
    let grid = idle_grid(2, 3);
    let set = grid.visible_cells().unwrap();
    assert_eq!(set.row_count(), 2);
    assert_eq!(set.column_count(), 3);
    assert_eq!(set.data_cells().len(), 6);
    assert_eq!(grid.window().rows.offset, 0);
}

// ============================================================================
// RECYCLE VS REGENERATE
// ============================================================================

#[test]
fn test_scroll_recycles_cells() {
    let mut grid = idle_grid(20, 20);
    let (ptr, generation) = {
        let set = grid.visible_cells().unwrap();
        (set.data_cells().as_ptr(), set.generation())
    };

    let update = grid.set_scroll_offset(200.0, 0.0, Instant::now());
    assert_eq!(update, Some(DisplayUpdate::Recycled));

    let set = grid.visible_cells().unwrap();
    assert_eq!(set.data_cells().as_ptr(), ptr);
    assert_eq!(set.generation(), generation);
    assert_eq!(set.column_header(1), Some(&2));
    assert_eq!(set.row_header(1), Some(&product_name(0)));
    assert_eq!(count_at(&grid, 1, 1), 2);
}

#[test]
fn test_resize_regenerates() {
    let mut grid = idle_grid(20, 20);
    let generation = grid.visible_cells().unwrap().generation();

    assert_eq!(grid.set_viewport_size(500.0, 300.0), DisplayUpdate::Regenerated);

    let set = grid.visible_cells().unwrap();
    assert_eq!(set.column_count(), 6);
    assert_eq!(set.row_count(), 4);
    assert_eq!(set.data_cells().len(), 24);
    assert_eq!(set.headers().len(), 1 + 4 + 6);
    assert!(set.generation() > generation);
}

#[test]
fn test_repeated_refresh_is_noop() {
    let mut grid = idle_grid(10, 10);
    assert_eq!(grid.refresh_display(false), DisplayUpdate::Unchanged);
    assert_eq!(grid.refresh_display(false), DisplayUpdate::Unchanged);
    assert_eq!(grid.refresh_display(true), DisplayUpdate::Recycled);
}

#[test]
fn test_headers_layout() {
    let grid = idle_grid(10, 10);
    let set = grid.visible_cells().unwrap();
    let headers = set.headers();

    assert_eq!(headers[0].content, HeaderContent::Corner);
    assert!(headers[1..5].iter().all(|h| h.column == 0 && h.row > 0));
    assert!(headers[5..].iter().all(|h| h.row == 0 && h.column > 0));
    assert_eq!(headers.iter().filter(|h| h.is_corner()).count(), 1);
}

#[test]
fn test_busy_grid_shows_nothing() {
    let mut grid = DynamicGrid::with_records(production_definition(), production_data(5, 5));
    assert_eq!(grid.set_viewport_size(300.0, 300.0), DisplayUpdate::Cleared);
    assert!(grid.visible_cells().is_none());

    grid.wait_idle().unwrap();
    assert!(grid.visible_cells().is_some());
}

// ============================================================================
// DEBOUNCED SCROLLING
// ============================================================================

#[test]
fn test_scroll_burst_applies_latest_offset_once() {
    let mut grid = idle_grid(20, 20);
    let t0 = Instant::now();
    let ms = Duration::from_millis;

    assert_eq!(grid.set_scroll_offset(100.0, 0.0, t0), Some(DisplayUpdate::Recycled));
    assert_eq!(grid.set_scroll_offset(200.0, 0.0, t0 + ms(10)), None);
    assert_eq!(grid.set_scroll_offset(300.0, 0.0, t0 + ms(20)), None);
    assert_eq!(grid.window().columns.offset, 1);

    assert_eq!(grid.tick(t0 + ms(100)).unwrap(), None);
    assert_eq!(grid.tick(t0 + ms(150)).unwrap(), Some(DisplayUpdate::Recycled));
    assert_eq!(grid.window().columns.offset, 3);
    assert_eq!(count_at(&grid, 1, 1), 3);

    // Window closes with nothing pending.
    assert_eq!(grid.tick(t0 + ms(400)).unwrap(), None);
    assert_eq!(grid.set_scroll_offset(0.0, 0.0, t0 + ms(410)), Some(DisplayUpdate::Recycled));
}

// ============================================================================
// SERIALIZATION
// ============================================================================

#[test]
fn test_visible_cells_serialize() {
    let grid = idle_grid(3, 3);
    let json = serde_json::to_value(grid.visible_cells().unwrap()).unwrap();

    assert_eq!(json["data_cells"].as_array().unwrap().len(), 9);
    assert_eq!(json["data_cells"][0]["row"], 1);
    assert_eq!(json["data_cells"][0]["content"]["Single"]["product"], "P0000");
    assert_eq!(json["data_cells"][4]["content"]["Single"]["count"], 1001);
    assert_eq!(json["headers"][0]["content"], "Corner");
    assert_eq!(json["headers"][1]["content"]["Row"], "P0000");
    assert_eq!(json["rows"][0]["is_odd"], true);
}
