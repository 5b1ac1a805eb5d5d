//! FILENAME: dyngrid-engine/src/engine.rs
//! Dynamic Grid - The facade that owns every cache and drives the passes.
//!
//! Threading model:
//! - The grid is owned by one thread. Every state change happens in a
//!   `&mut self` method on that thread.
//! - Discovery and the cache build run on the worker pool, against an
//!   `Arc` snapshot of the records and a clone of the definition.
//! - Stage results are queued and only applied by `pump()`, `tick()` or
//!   `wait_idle()`, so the caches are swapped by the owner alone.
//!
//! Flow of one pass:
//!   data changed -> discovery (worker) -> build (worker) -> commit -> synthesis
//! Scroll and resize skip the pass and go straight to synthesis.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::{build_content_matrix, ContentMatrix};
use crate::comparer::KeyComparer;
use crate::definition::{validate_item_size, GridDefinition, GridKey, GridSettings, GridValue};
use crate::display::{DisplayInput, DisplaySynthesizer};
use crate::error::GridError;
use crate::headers::{discover_headers, HeaderCache};
use crate::limiter::EventLimiter;
use crate::parallel::StageWorker;
use crate::rebuild::{RebuildOrchestrator, RebuildStage, RebuildState, RebuildStats, StageVerdict};
use crate::source::RecordSource;
use crate::view::{DisplayUpdate, VisibleCellSet};
use crate::window::{logical_extent, GridWindow, PixelSize, ScrollOffsets, ScrollState};
use crate::{log_debug, log_enter, log_error, log_exit};

/// A finished stage, on its way back to the owner.
enum StageOutput<R, TRow, TCol, A> {
    Discovered {
        pass: u64,
        records: Arc<Vec<R>>,
        headers: HeaderCache<TRow, TCol>,
    },
    /// Carries the headers it was built against so both caches are swapped together.
    Built {
        pass: u64,
        headers: Arc<HeaderCache<TRow, TCol>>,
        matrix: Result<ContentMatrix<R, A>, GridError>,
    },
}

pub struct DynamicGrid<R, TRow, TCol, A> {
    definition: GridDefinition<R, TRow, TCol, A>,
    source: RecordSource<R>,

    // Replaced wholesale by each committed pass; `None` before the first
    // pass and after an empty source.
    headers: Option<Arc<HeaderCache<TRow, TCol>>>,
    matrix: Option<Arc<ContentMatrix<R, A>>>,

    orchestrator: RebuildOrchestrator,
    worker: StageWorker<StageOutput<R, TRow, TCol, A>>,
    display: DisplaySynthesizer<R, TRow, TCol, A>,

    scroll: ScrollState,
    scroll_limiter: EventLimiter<ScrollOffsets>,
    window: GridWindow,
}

impl<R, TRow, TCol, A> DynamicGrid<R, TRow, TCol, A>
where
    R: GridValue,
    TRow: GridKey,
    TCol: GridKey,
    A: GridValue,
{
    pub fn new(definition: GridDefinition<R, TRow, TCol, A>) -> Self {
        let scroll_limiter = EventLimiter::from_millis(definition.settings().scroll_interval_ms);
        DynamicGrid {
            definition,
            source: RecordSource::default(),
            headers: None,
            matrix: None,
            orchestrator: RebuildOrchestrator::new(),
            worker: StageWorker::new(),
            display: DisplaySynthesizer::new(),
            scroll: ScrollState::new(),
            scroll_limiter,
            window: GridWindow::default(),
        }
    }

    /// Creates the grid and starts the first pass over `records`.
    pub fn with_records(definition: GridDefinition<R, TRow, TCol, A>, records: Vec<R>) -> Self {
        let mut grid = DynamicGrid::new(definition);
        grid.set_records(records);
        grid
    }

    // ========================================================================
    // DATA SOURCE
    // ========================================================================

    pub fn records(&self) -> &RecordSource<R> {
        &self.source
    }

    /// Replaces every record and signals the change.
    pub fn set_records(&mut self, records: Vec<R>) {
        let change = self.source.reset(records);
        log_debug!("SOURCE", "{:?}", change);
        self.notify_data_changed();
    }

    /// Applies a batch of edits. Signals one change if anything was edited.
    pub fn update_records<F, T>(&mut self, edit: F) -> T
    where
        F: FnOnce(&mut RecordSource<R>) -> T,
    {
        let before = self.source.version();
        let result = edit(&mut self.source);
        let edits = self.source.version() - before;
        if edits > 0 {
            log_debug!("SOURCE", "{} edits, last {:?}", edits, self.source.last_change());
            self.notify_data_changed();
        }
        result
    }

    /// The data-changed signal. Starts a pass, or marks the running one stale.
    pub fn notify_data_changed(&mut self) {
        if let Some(pass) = self.orchestrator.on_data_changed() {
            self.begin_pass(pass);
        }
    }

    // ========================================================================
    // PASS EXECUTION
    // ========================================================================

    fn begin_pass(&mut self, pass: u64) {
        let records = self.source.snapshot();

        if records.is_empty() {
            // Nothing to discover: no worker is involved, so the pass ends here.
            self.clear_caches();
            self.orchestrator.finish_pass();
            self.refresh_display(true);
            return;
        }

        let definition = self.definition.clone();
        self.worker.spawn(move || {
            let headers = discover_headers(&records, &definition);
            StageOutput::Discovered { pass, records, headers }
        });
    }

    fn begin_build(&mut self, pass: u64, records: Arc<Vec<R>>, headers: HeaderCache<TRow, TCol>) {
        let definition = self.definition.clone();
        let headers = Arc::new(headers);
        self.worker.spawn(move || {
            let matrix = build_content_matrix(&records, &headers, &definition);
            StageOutput::Built { pass, headers, matrix }
        });
    }

    fn apply(&mut self, output: StageOutput<R, TRow, TCol, A>) -> Result<(), GridError> {
        match output {
            StageOutput::Discovered { pass, records, headers } => {
                match self.orchestrator.on_stage_complete(pass, RebuildStage::Discovery) {
                    StageVerdict::Continue => self.begin_build(pass, records, headers),
                    StageVerdict::Restart { pass } => self.begin_pass(pass),
                    StageVerdict::Commit | StageVerdict::Stale => {}
                }
                Ok(())
            }
            StageOutput::Built { pass, headers, matrix } => {
                match self.orchestrator.on_stage_complete(pass, RebuildStage::Build) {
                    StageVerdict::Commit => self.commit(headers, matrix),
                    StageVerdict::Restart { pass } => {
                        self.begin_pass(pass);
                        Ok(())
                    }
                    StageVerdict::Continue | StageVerdict::Stale => Ok(()),
                }
            }
        }
    }

    fn commit(
        &mut self,
        headers: Arc<HeaderCache<TRow, TCol>>,
        matrix: Result<ContentMatrix<R, A>, GridError>,
    ) -> Result<(), GridError> {
        match matrix {
            Ok(matrix) => {
                self.headers = Some(headers);
                self.matrix = Some(Arc::new(matrix));
                self.update_extent();
                self.orchestrator.finish_pass();
                self.refresh_display(true);
                Ok(())
            }
            Err(err) => {
                log_error!("REBUILD", "pass {} dropped: {}", self.orchestrator.current_pass(), err);
                self.clear_caches();
                self.orchestrator.fail_pass();
                self.refresh_display(true);
                Err(err)
            }
        }
    }

    fn clear_caches(&mut self) {
        self.headers = None;
        self.matrix = None;
        self.update_extent();
    }

    /// Applies every stage result that is ready, without blocking.
    ///
    /// A contract violation in the cache build is returned here; the grid is
    /// idle with empty caches afterwards.
    pub fn pump(&mut self) -> Result<(), GridError> {
        while let Some(output) = self.worker.try_next() {
            self.apply(output)?;
        }
        Ok(())
    }

    /// Blocks until no pass is running.
    pub fn wait_idle(&mut self) -> Result<(), GridError> {
        log_enter!("REBUILD", "wait_idle", "pass={}", self.orchestrator.current_pass());
        while self.orchestrator.is_busy() {
            match self.worker.next_blocking() {
                Some(output) => self.apply(output)?,
                None => break,
            }
        }
        log_exit!("REBUILD", "wait_idle");
        Ok(())
    }

    /// Like `wait_idle`, giving up after `timeout`. Returns whether the grid is idle.
    pub fn wait_idle_timeout(&mut self, timeout: Duration) -> Result<bool, GridError> {
        let deadline = Instant::now() + timeout;
        while self.orchestrator.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if let Some(output) = self.worker.next_timeout(remaining) {
                self.apply(output)?;
            }
        }
        Ok(!self.orchestrator.is_busy())
    }

    // ========================================================================
    // VIEWPORT
    // ========================================================================

    /// Records a scroll position. The window is recomputed at most once per
    /// scroll interval; a deferred recompute is released by `tick()`.
    pub fn set_scroll_offset(&mut self, horizontal: f64, vertical: f64, now: Instant) -> Option<DisplayUpdate> {
        let offsets = self.scroll.set_offsets(ScrollOffsets::new(horizontal, vertical));
        self.scroll_limiter
            .trigger(offsets, now)
            .map(|_| self.refresh_display(false))
    }

    /// Drains finished stages and releases a deferred scroll recompute.
    pub fn tick(&mut self, now: Instant) -> Result<Option<DisplayUpdate>, GridError> {
        self.pump()?;
        Ok(self
            .scroll_limiter
            .poll(now)
            .map(|_| self.refresh_display(false)))
    }

    /// Viewport resize. Recomputes right away.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) -> DisplayUpdate {
        self.scroll.set_viewport(PixelSize::new(width, height));
        self.refresh_display(false)
    }

    pub fn set_item_size(&mut self, width: f64, height: f64) -> Result<DisplayUpdate, GridError> {
        validate_item_size(width, height)?;
        self.definition.settings.item_width = width;
        self.definition.settings.item_height = height;
        self.update_extent();
        Ok(self.refresh_display(false))
    }

    /// New row ordering; applied by the pass this starts.
    pub fn set_row_comparer(&mut self, comparer: Option<KeyComparer<TRow>>) {
        self.definition.row_comparer = comparer;
        self.notify_data_changed();
    }

    /// New column ordering; applied by the pass this starts.
    pub fn set_column_comparer(&mut self, comparer: Option<KeyComparer<TCol>>) {
        self.definition.column_comparer = comparer;
        self.notify_data_changed();
    }

    /// Recomputes the window from the current caches and scroll state and
    /// runs synthesis.
    pub fn refresh_display(&mut self, force_update: bool) -> DisplayUpdate {
        let settings = self.definition.settings();
        let (row_total, column_total) = self
            .headers
            .as_ref()
            .map_or((0, 0), |h| (h.row_count(), h.column_count()));

        self.window = GridWindow::compute(
            self.scroll.viewport(),
            PixelSize::new(settings.item_width, settings.item_height),
            self.scroll.offsets(),
            row_total,
            column_total,
        );

        self.display.synthesize(DisplayInput {
            busy: self.orchestrator.is_busy(),
            headers: self.headers.as_deref(),
            matrix: self.matrix.as_deref(),
            window: self.window,
            force_update,
        })
    }

    fn update_extent(&mut self) {
        let settings = self.definition.settings();
        let (rows, columns) = self
            .headers
            .as_ref()
            .map_or((0, 0), |h| (h.row_count(), h.column_count()));
        let extent = logical_extent(
            rows,
            columns,
            PixelSize::new(settings.item_width, settings.item_height),
        );
        self.scroll.set_extent(extent);
    }

    // ========================================================================
    // OBSERVABLE STATE
    // ========================================================================

    pub fn definition(&self) -> &GridDefinition<R, TRow, TCol, A> {
        &self.definition
    }

    pub fn settings(&self) -> &GridSettings {
        self.definition.settings()
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    /// Shared busy flag, readable from any thread.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        self.orchestrator.busy_flag()
    }

    pub fn rebuild_state(&self) -> RebuildState {
        self.orchestrator.state()
    }

    pub fn stats(&self) -> &RebuildStats {
        self.orchestrator.stats()
    }

    /// Row slots of the current window, including the partially visible one.
    pub fn row_count(&self) -> usize {
        self.window.rows.capacity
    }

    /// Column slots of the current window, including the partially visible one.
    pub fn column_count(&self) -> usize {
        self.window.columns.capacity
    }

    pub fn window(&self) -> GridWindow {
        self.window
    }

    pub fn visible_cells(&self) -> Option<&VisibleCellSet<R, TRow, TCol, A>> {
        self.display.visible()
    }

    /// Total scrollable size, for an external scrollbar.
    pub fn logical_extent(&self) -> PixelSize {
        self.scroll.extent()
    }

    pub fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn headers(&self) -> Option<Arc<HeaderCache<TRow, TCol>>> {
        self.headers.clone()
    }

    pub fn content_matrix(&self) -> Option<Arc<ContentMatrix<R, A>>> {
        self.matrix.clone()
    }
}
