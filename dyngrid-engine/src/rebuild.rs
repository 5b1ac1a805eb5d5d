//! FILENAME: dyngrid-engine/src/rebuild.rs
//! PURPOSE: Serializes rebuild passes and coalesces data-changed signals.
//! CONTEXT: A pass is header discovery followed by the cache build. Only one
//! pass runs at a time. Signals that arrive mid-pass collapse into a single
//! pending retrigger, which is honoured at the next stage boundary by
//! abandoning the stale pass and starting over from discovery.
//!
//! The orchestrator only tracks state; the grid facade runs the stages and
//! reports back. The busy flag is shared so hosts can observe it from any
//! thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{log_debug, log_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebuildState {
    Idle,
    Building,
    /// Building, and at least one signal arrived since the pass started.
    BuildingWithPendingRetrigger,
}

/// The two stages of a pass, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebuildStage {
    Discovery,
    Build,
}

/// What the owner should do after a stage of `pass` completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageVerdict {
    /// Discovery done and nothing changed: run the build.
    Continue,
    /// Build done and nothing changed: commit and call `finish_pass`.
    Commit,
    /// A signal arrived meanwhile: drop this result and start `pass` from discovery.
    Restart { pass: u64 },
    /// Result of a pass that is no longer current. Ignore it.
    Stale,
}

/// Counters for hosts and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildStats {
    pub passes_started: u64,
    pub passes_completed: u64,
    pub passes_superseded: u64,
    pub passes_failed: u64,
    /// Signals absorbed by an in-flight pass instead of starting one.
    pub signals_coalesced: u64,
}

#[derive(Debug)]
pub struct RebuildOrchestrator {
    state: RebuildState,
    busy: Arc<AtomicBool>,
    current_pass: u64,
    stats: RebuildStats,
}

impl RebuildOrchestrator {
    pub fn new() -> Self {
        RebuildOrchestrator {
            state: RebuildState::Idle,
            busy: Arc::new(AtomicBool::new(false)),
            current_pass: 0,
            stats: RebuildStats::default(),
        }
    }

    pub fn state(&self) -> RebuildState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Shared handle to the busy flag.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    pub fn current_pass(&self) -> u64 {
        self.current_pass
    }

    pub fn stats(&self) -> &RebuildStats {
        &self.stats
    }

    /// A data-changed signal. Returns the pass to start, if any.
    pub fn on_data_changed(&mut self) -> Option<u64> {
        match self.state {
            RebuildState::Idle => Some(self.start_pass()),
            RebuildState::Building | RebuildState::BuildingWithPendingRetrigger => {
                self.state = RebuildState::BuildingWithPendingRetrigger;
                self.stats.signals_coalesced += 1;
                log_debug!("REBUILD", "signal coalesced into pass {}", self.current_pass);
                None
            }
        }
    }

    /// A stage of `pass` finished on a worker.
    pub fn on_stage_complete(&mut self, pass: u64, stage: RebuildStage) -> StageVerdict {
        if pass != self.current_pass {
            return StageVerdict::Stale;
        }

        match self.state {
            RebuildState::Idle => StageVerdict::Stale,
            RebuildState::Building => match stage {
                RebuildStage::Discovery => StageVerdict::Continue,
                RebuildStage::Build => StageVerdict::Commit,
            },
            RebuildState::BuildingWithPendingRetrigger => {
                self.stats.passes_superseded += 1;
                log_debug!("REBUILD", "pass {} superseded after {:?}", pass, stage);
                StageVerdict::Restart {
                    pass: self.start_pass(),
                }
            }
        }
    }

    /// Ends the current pass after its results were committed, or after it
    /// short-circuited on an empty source.
    pub fn finish_pass(&mut self) {
        self.stats.passes_completed += 1;
        self.end_pass();
        log_info!("REBUILD", "pass {} completed", self.current_pass);
    }

    /// Ends the current pass without committing anything.
    pub fn fail_pass(&mut self) {
        self.stats.passes_failed += 1;
        self.end_pass();
        log_info!("REBUILD", "pass {} failed", self.current_pass);
    }

    fn start_pass(&mut self) -> u64 {
        self.current_pass += 1;
        self.state = RebuildState::Building;
        self.stats.passes_started += 1;
        self.busy.store(true, Ordering::Release);
        log_debug!("REBUILD", "pass {} started", self.current_pass);
        self.current_pass
    }

    fn end_pass(&mut self) {
        self.state = RebuildState::Idle;
        self.busy.store(false, Ordering::Release);
    }
}

impl Default for RebuildOrchestrator {
    fn default() -> Self {
        RebuildOrchestrator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninterrupted_pass() {
        let mut orch = RebuildOrchestrator::new();
        assert!(!orch.is_busy());

        let pass = orch.on_data_changed().unwrap();
        assert!(orch.is_busy());
        assert_eq!(orch.state(), RebuildState::Building);

        assert_eq!(orch.on_stage_complete(pass, RebuildStage::Discovery), StageVerdict::Continue);
        assert_eq!(orch.on_stage_complete(pass, RebuildStage::Build), StageVerdict::Commit);
        orch.finish_pass();

        assert_eq!(orch.state(), RebuildState::Idle);
        assert!(!orch.is_busy());
        assert_eq!(orch.stats().passes_completed, 1);
    }

    #[test]
    fn test_signals_during_pass_collapse_to_one_restart() {
        let mut orch = RebuildOrchestrator::new();
        let first = orch.on_data_changed().unwrap();

        assert_eq!(orch.on_data_changed(), None);
        assert_eq!(orch.on_data_changed(), None);
        assert_eq!(orch.on_data_changed(), None);
        assert_eq!(orch.state(), RebuildState::BuildingWithPendingRetrigger);

        let second = match orch.on_stage_complete(first, RebuildStage::Discovery) {
            StageVerdict::Restart { pass } => pass,
            other => panic!("expected restart, got {:?}", other),
        };
        assert_eq!(orch.state(), RebuildState::Building);
        assert!(orch.is_busy());

        assert_eq!(orch.on_stage_complete(second, RebuildStage::Discovery), StageVerdict::Continue);
        assert_eq!(orch.on_stage_complete(second, RebuildStage::Build), StageVerdict::Commit);
        orch.finish_pass();

        let stats = orch.stats();
        assert_eq!(stats.passes_started, 2);
        assert_eq!(stats.passes_superseded, 1);
        assert_eq!(stats.passes_completed, 1);
        assert_eq!(stats.signals_coalesced, 3);
    }

    #[test]
    fn test_signal_during_build_stage_restarts() {
        let mut orch = RebuildOrchestrator::new();
        let pass = orch.on_data_changed().unwrap();
        assert_eq!(orch.on_stage_complete(pass, RebuildStage::Discovery), StageVerdict::Continue);

        orch.on_data_changed();
        assert!(matches!(
            orch.on_stage_complete(pass, RebuildStage::Build),
            StageVerdict::Restart { .. }
        ));
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let mut orch = RebuildOrchestrator::new();
        assert_eq!(orch.on_stage_complete(1, RebuildStage::Build), StageVerdict::Stale);

        let pass = orch.on_data_changed().unwrap();
        assert_eq!(orch.on_stage_complete(pass + 7, RebuildStage::Build), StageVerdict::Stale);
    }

    #[test]
    fn test_failed_pass_returns_to_idle() {
        let mut orch = RebuildOrchestrator::new();
        let flag = orch.busy_flag();
        orch.on_data_changed();
        assert!(flag.load(Ordering::Acquire));

        orch.fail_pass();
        assert!(!flag.load(Ordering::Acquire));
        assert_eq!(orch.stats().passes_failed, 1);
        assert_eq!(orch.on_data_changed(), Some(2));
    }
}
