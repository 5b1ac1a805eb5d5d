//! FILENAME: dyngrid-engine/src/definition.rs
//! Grid Definition - What the grid IS.
//!
//! This module contains everything needed to DESCRIBE a dynamic grid:
//! - How a record maps to a row key and a column key (selectors)
//! - How colliding records are reduced to one value (aggregator)
//! - How header keys are ordered (optional comparers)
//! - Serializable display settings (item size, scroll interval)

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::comparer::KeyComparer;
use crate::error::GridError;
use crate::limiter::DEFAULT_SCROLL_INTERVAL_MS;

/// Bound for header keys: hashable for deduplication, shareable with workers.
pub trait GridKey: Clone + Eq + Hash + Send + Sync + 'static {}
impl<T: Clone + Eq + Hash + Send + Sync + 'static> GridKey for T {}

/// Bound for records and aggregated values: owned by the cache, shared with workers.
pub trait GridValue: Clone + Send + Sync + 'static {}
impl<T: Clone + Send + Sync + 'static> GridValue for T {}

/// Extracts a header key from a record.
pub type Selector<R, K> = Arc<dyn Fn(&R) -> K + Send + Sync>;

/// Reduces every record that landed on one cell to a single value.
/// Always called with at least two records.
pub type Aggregator<R, A> = Arc<dyn Fn(&[&R]) -> A + Send + Sync>;

// ============================================================================
// SETTINGS
// ============================================================================

/// Default cell width in pixels.
pub const DEFAULT_ITEM_WIDTH: f64 = 130.0;

/// Default cell height in pixels.
pub const DEFAULT_ITEM_HEIGHT: f64 = 35.0;

/// Serializable display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Width of one cell (and of the row header column) in pixels.
    pub item_width: f64,

    /// Height of one cell (and of the column header row) in pixels.
    pub item_height: f64,

    /// Minimum time between two scroll-driven recomputes.
    pub scroll_interval_ms: u64,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            item_width: DEFAULT_ITEM_WIDTH,
            item_height: DEFAULT_ITEM_HEIGHT,
            scroll_interval_ms: DEFAULT_SCROLL_INTERVAL_MS,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), GridError> {
        validate_item_size(self.item_width, self.item_height)
    }
}

/// Item sizes divide pixel offsets, so they must be positive and finite.
pub fn validate_item_size(width: f64, height: f64) -> Result<(), GridError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(GridError::InvalidItemSize { width, height })
    }
}

// ============================================================================
// DEFINITION
// ============================================================================

/// The full grid configuration. Cloning is cheap: every function is shared.
pub struct GridDefinition<R, TRow, TCol, A> {
    pub(crate) row_selector: Selector<R, TRow>,
    pub(crate) column_selector: Selector<R, TCol>,
    pub(crate) aggregator: Aggregator<R, A>,
    pub(crate) row_comparer: Option<KeyComparer<TRow>>,
    pub(crate) column_comparer: Option<KeyComparer<TCol>>,
    pub(crate) settings: GridSettings,
}

impl<R, TRow, TCol, A> GridDefinition<R, TRow, TCol, A> {
    pub fn builder() -> GridDefinitionBuilder<R, TRow, TCol, A> {
        GridDefinitionBuilder::new()
    }

    pub fn row_key(&self, record: &R) -> TRow {
        (self.row_selector)(record)
    }

    pub fn column_key(&self, record: &R) -> TCol {
        (self.column_selector)(record)
    }

    pub fn aggregate(&self, records: &[&R]) -> A {
        (self.aggregator)(records)
    }

    pub fn row_comparer(&self) -> Option<&KeyComparer<TRow>> {
        self.row_comparer.as_ref()
    }

    pub fn column_comparer(&self) -> Option<&KeyComparer<TCol>> {
        self.column_comparer.as_ref()
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }
}

impl<R, TRow, TCol, A> Clone for GridDefinition<R, TRow, TCol, A> {
    fn clone(&self) -> Self {
        GridDefinition {
            row_selector: Arc::clone(&self.row_selector),
            column_selector: Arc::clone(&self.column_selector),
            aggregator: Arc::clone(&self.aggregator),
            row_comparer: self.row_comparer.clone(),
            column_comparer: self.column_comparer.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R, TRow, TCol, A> fmt::Debug for GridDefinition<R, TRow, TCol, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridDefinition")
            .field("row_comparer", &self.row_comparer.is_some())
            .field("column_comparer", &self.column_comparer.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects the grid functions; `build()` fails fast if any is missing.
pub struct GridDefinitionBuilder<R, TRow, TCol, A> {
    row_selector: Option<Selector<R, TRow>>,
    column_selector: Option<Selector<R, TCol>>,
    aggregator: Option<Aggregator<R, A>>,
    row_comparer: Option<KeyComparer<TRow>>,
    column_comparer: Option<KeyComparer<TCol>>,
    settings: GridSettings,
}

impl<R, TRow, TCol, A> GridDefinitionBuilder<R, TRow, TCol, A> {
    pub fn new() -> Self {
        GridDefinitionBuilder {
            row_selector: None,
            column_selector: None,
            aggregator: None,
            row_comparer: None,
            column_comparer: None,
            settings: GridSettings::default(),
        }
    }

    pub fn row_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&R) -> TRow + Send + Sync + 'static,
    {
        self.row_selector = Some(Arc::new(selector));
        self
    }

    pub fn column_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&R) -> TCol + Send + Sync + 'static,
    {
        self.column_selector = Some(Arc::new(selector));
        self
    }

    pub fn aggregator<F>(mut self, aggregator: F) -> Self
    where
        F: Fn(&[&R]) -> A + Send + Sync + 'static,
    {
        self.aggregator = Some(Arc::new(aggregator));
        self
    }

    pub fn row_comparer(mut self, comparer: KeyComparer<TRow>) -> Self {
        self.row_comparer = Some(comparer);
        self
    }

    pub fn column_comparer(mut self, comparer: KeyComparer<TCol>) -> Self {
        self.column_comparer = Some(comparer);
        self
    }

    pub fn settings(mut self, settings: GridSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn item_size(mut self, width: f64, height: f64) -> Self {
        self.settings.item_width = width;
        self.settings.item_height = height;
        self
    }

    pub fn build(self) -> Result<GridDefinition<R, TRow, TCol, A>, GridError> {
        let row_selector = self
            .row_selector
            .ok_or(GridError::MissingFunction("row selector"))?;
        let column_selector = self
            .column_selector
            .ok_or(GridError::MissingFunction("column selector"))?;
        let aggregator = self
            .aggregator
            .ok_or(GridError::MissingFunction("aggregator"))?;
        self.settings.validate()?;

        Ok(GridDefinition {
            row_selector,
            column_selector,
            aggregator,
            row_comparer: self.row_comparer,
            column_comparer: self.column_comparer,
            settings: self.settings,
        })
    }
}

impl<R, TRow, TCol, A> Default for GridDefinitionBuilder<R, TRow, TCol, A> {
    fn default() -> Self {
        GridDefinitionBuilder::new()
    }
}
