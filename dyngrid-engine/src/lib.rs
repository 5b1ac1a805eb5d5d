//! FILENAME: dyngrid-engine/src/lib.rs
//! Dynamic grid engine.
//!
//! Turns a flat collection of records into a virtualized two-dimensional
//! grid whose rows and columns are discovered from the data. Records that
//! land on the same (row, column) position are reduced by an aggregator.
//! Only the window visible in the viewport is ever materialized as cells.
//!
//! Layers:
//! - `definition`: Selectors, aggregator, comparers, settings (what the grid IS)
//! - `headers`, `cache`: Key discovery and the content matrix (HOW we compute)
//! - `window`, `view`: Viewport math and visible cells (WHAT we display)
//! - `display`, `rebuild`, `engine`: Synthesis, pass serialization, and the
//!   `DynamicGrid` facade that owns all of it

pub mod logging;

pub mod error;
pub mod comparer;
pub mod limiter;
pub mod definition;
pub mod source;
mod parallel;
pub mod headers;
pub mod cache;
pub mod window;
pub mod view;
pub mod display;
pub mod rebuild;
pub mod engine;

pub use error::GridError;
pub use comparer::KeyComparer;
pub use limiter::{EventLimiter, DEFAULT_SCROLL_INTERVAL_MS};
pub use definition::*;
pub use source::{RecordSource, SourceChange};
pub use headers::{discover_headers, HeaderCache, KeyIndex};
pub use cache::{build_content_matrix, ContentMatrix, GridCell, MatrixStats};
pub use window::{compute_axis_window, logical_extent, AxisWindow, GridWindow, PixelSize, ScrollOffsets, ScrollState};
pub use view::*;
pub use display::{DisplayInput, DisplaySynthesizer};
pub use rebuild::{RebuildOrchestrator, RebuildStage, RebuildState, RebuildStats, StageVerdict};
pub use engine::DynamicGrid;
