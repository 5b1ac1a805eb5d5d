//! FILENAME: dyngrid-engine/src/window.rs
//! Viewport Windower - Which slice of the key space is on screen.
//!
//! Both axes use the same arithmetic:
//! - capacity = whole items that fit in the viewport, plus one partial item
//! - offset   = whole items scrolled past, clamped so the window never runs
//!   past the last key
//! - visible  = capacity, or fewer when there are fewer keys than that
//!
//! `ScrollState` holds the raw pixel values the host reports and keeps the
//! offsets inside the logical extent.

use serde::{Deserialize, Serialize};

// ============================================================================
// PIXEL GEOMETRY
// ============================================================================

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    pub fn new(width: f64, height: f64) -> Self {
        PixelSize { width, height }
    }
}

/// Raw scroll position in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffsets {
    pub horizontal: f64,
    pub vertical: f64,
}

impl ScrollOffsets {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        ScrollOffsets { horizontal, vertical }
    }
}

/// Number of whole items covered by `px`. Negative, NaN and degenerate
/// inputs count as zero items.
fn whole_items(px: f64, item_px: f64) -> usize {
    if !(px > 0.0) || !(item_px > 0.0) {
        return 0;
    }
    // Float-to-int casts saturate, so huge ratios cannot wrap.
    (px / item_px).floor() as usize
}

// ============================================================================
// AXIS WINDOW
// ============================================================================

/// Visible slice of one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisWindow {
    /// Index of the first visible key.
    pub offset: usize,

    /// Keys actually shown. Never more than the keys that exist.
    pub visible_count: usize,

    /// Keys the viewport could show, including the partial trailing one.
    pub capacity: usize,
}

impl AxisWindow {
    /// One past the last visible key index.
    pub fn end(&self) -> usize {
        self.offset + self.visible_count
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.offset && index < self.end()
    }
}

/// Computes the window of one axis.
///
/// `offset + visible_count <= total` always holds, and `offset` is 0 whenever
/// all keys fit into the viewport.
pub fn compute_axis_window(viewport_px: f64, item_px: f64, scroll_px: f64, total: usize) -> AxisWindow {
    let capacity = whole_items(viewport_px, item_px).saturating_add(1);
    let offset = whole_items(scroll_px, item_px).min(total.saturating_sub(capacity));

    AxisWindow {
        offset,
        visible_count: capacity.min(total),
        capacity,
    }
}

/// Visible slice of both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWindow {
    pub rows: AxisWindow,
    pub columns: AxisWindow,
}

impl GridWindow {
    /// Rows follow the heights and the vertical offset; columns the widths
    /// and the horizontal offset.
    pub fn compute(
        viewport: PixelSize,
        item: PixelSize,
        scroll: ScrollOffsets,
        row_total: usize,
        column_total: usize,
    ) -> Self {
        GridWindow {
            rows: compute_axis_window(viewport.height, item.height, scroll.vertical, row_total),
            columns: compute_axis_window(viewport.width, item.width, scroll.horizontal, column_total),
        }
    }

    /// (visible rows, visible columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.visible_count, self.columns.visible_count)
    }

    /// (row offset, column offset).
    pub fn offsets(&self) -> (usize, usize) {
        (self.rows.offset, self.columns.offset)
    }
}

/// Total scrollable size for the given key counts: one extra item per axis
/// for the header row/column. An axis without keys has no extent.
pub fn logical_extent(row_keys: usize, column_keys: usize, item: PixelSize) -> PixelSize {
    let axis = |keys: usize, item_px: f64| {
        if keys == 0 {
            0.0
        } else {
            (keys as f64 + 1.0) * item_px
        }
    };
    PixelSize {
        width: axis(column_keys, item.width),
        height: axis(row_keys, item.height),
    }
}

// ============================================================================
// SCROLL STATE
// ============================================================================

/// Extent, viewport and offsets of the scrollable surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    extent: PixelSize,
    viewport: PixelSize,
    offsets: ScrollOffsets,
}

fn clamp_offset(offset: f64, viewport: f64, extent: f64) -> f64 {
    let max = extent - viewport;
    if !(offset > 0.0) || !(max > 0.0) {
        return 0.0;
    }
    offset.min(max)
}

impl ScrollState {
    pub fn new() -> Self {
        ScrollState::default()
    }

    pub fn extent(&self) -> PixelSize {
        self.extent
    }

    pub fn viewport(&self) -> PixelSize {
        self.viewport
    }

    pub fn offsets(&self) -> ScrollOffsets {
        self.offsets
    }

    pub fn set_extent(&mut self, extent: PixelSize) {
        self.extent = extent;
        self.reclamp();
    }

    pub fn set_viewport(&mut self, viewport: PixelSize) {
        self.viewport = viewport;
        self.reclamp();
    }

    /// Returns the offset actually applied.
    pub fn set_horizontal_offset(&mut self, offset: f64) -> f64 {
        self.offsets.horizontal = clamp_offset(offset, self.viewport.width, self.extent.width);
        self.offsets.horizontal
    }

    /// Returns the offset actually applied.
    pub fn set_vertical_offset(&mut self, offset: f64) -> f64 {
        self.offsets.vertical = clamp_offset(offset, self.viewport.height, self.extent.height);
        self.offsets.vertical
    }

    pub fn set_offsets(&mut self, offsets: ScrollOffsets) -> ScrollOffsets {
        self.set_horizontal_offset(offsets.horizontal);
        self.set_vertical_offset(offsets.vertical);
        self.offsets
    }

    pub fn can_scroll_horizontally(&self) -> bool {
        self.viewport.width < self.extent.width
    }

    pub fn can_scroll_vertically(&self) -> bool {
        self.viewport.height < self.extent.height
    }

    fn reclamp(&mut self) {
        let offsets = self.offsets;
        self.set_offsets(offsets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_window_scenario() {
        // 300px viewport, 100px items: 3 whole + 1 partial.
        let w = compute_axis_window(300.0, 100.0, 1000.0, 5);
        assert_eq!(w.capacity, 4);
        assert_eq!(w.visible_count, 4);
        assert_eq!(w.offset, 1);
        assert_eq!(w.end(), 5);
    }

    #[test]
    fn test_offset_zero_when_everything_fits() {
        let w = compute_axis_window(300.0, 100.0, 250.0, 3);
        assert_eq!(w.offset, 0);
        assert_eq!(w.visible_count, 3);
        assert_eq!(w.capacity, 4);

        let w = compute_axis_window(300.0, 100.0, 250.0, 0);
        assert_eq!(w.offset, 0);
        assert_eq!(w.visible_count, 0);
    }

    #[test]
    fn test_window_never_passes_total() {
        for total in 0..40usize {
            for scroll in (0..5000).step_by(37) {
                for viewport in [0.0, 35.0, 99.0, 350.0, 1200.0] {
                    let w = compute_axis_window(viewport, 35.0, scroll as f64, total);
                    if total > 0 {
                        assert!(w.end() <= total, "total={} scroll={} viewport={}", total, scroll, viewport);
                    }
                    if total <= w.capacity {
                        assert_eq!(w.offset, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        let w = compute_axis_window(-50.0, 100.0, -10.0, 10);
        assert_eq!(w.capacity, 1);
        assert_eq!(w.offset, 0);

        let w = compute_axis_window(f64::NAN, 100.0, f64::NAN, 10);
        assert_eq!(w.capacity, 1);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_grid_window_uses_matching_axes() {
        let window = GridWindow::compute(
            PixelSize::new(390.0, 70.0),
            PixelSize::new(130.0, 35.0),
            ScrollOffsets::new(130.0, 35.0),
            100,
            100,
        );
        assert_eq!(window.columns.capacity, 4);
        assert_eq!(window.rows.capacity, 3);
        assert_eq!(window.offsets(), (1, 1));
        assert_eq!(window.shape(), (3, 4));
        assert!(window.rows.contains(3));
        assert!(!window.rows.contains(4));
    }

    #[test]
    fn test_logical_extent() {
        let item = PixelSize::new(130.0, 35.0);
        assert_eq!(logical_extent(0, 0, item), PixelSize::new(0.0, 0.0));
        assert_eq!(logical_extent(9, 4, item), PixelSize::new(650.0, 350.0));
    }

    #[test]
    fn test_scroll_state_clamps() {
        let mut state = ScrollState::new();
        state.set_viewport(PixelSize::new(300.0, 300.0));
        state.set_extent(PixelSize::new(600.0, 200.0));

        assert!(state.can_scroll_horizontally());
        assert!(!state.can_scroll_vertically());

        assert_eq!(state.set_horizontal_offset(1000.0), 300.0);
        assert_eq!(state.set_horizontal_offset(-5.0), 0.0);
        assert_eq!(state.set_vertical_offset(50.0), 0.0);

        state.set_horizontal_offset(250.0);
        // Growing the viewport pulls the offset back in.
        state.set_viewport(PixelSize::new(500.0, 300.0));
        assert_eq!(state.offsets().horizontal, 100.0);

        state.set_viewport(PixelSize::new(800.0, 300.0));
        assert_eq!(state.offsets().horizontal, 0.0);
    }
}
