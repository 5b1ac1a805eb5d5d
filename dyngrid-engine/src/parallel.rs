//! FILENAME: dyngrid-engine/src/parallel.rs
//! PURPOSE: Worker execution for rebuild stages.
//! CONTEXT: Header discovery and cache building run off the owner thread on
//! a crate-local Rayon pool. Results travel back over a channel and are only
//! applied when the owner drains it, so all grid state keeps a single writer.
//!
//! If no pool can be created, jobs run inline on the caller. The results
//! still go through the channel, so the control flow is identical.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use once_cell::sync::Lazy;
use rayon::ThreadPool;

static RAYON_POOL: Lazy<Option<ThreadPool>> = Lazy::new(build_rayon_pool);

fn desired_threads() -> usize {
    let from_env = std::env::var("DYNGRID_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0);
    from_env.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

fn build_rayon_pool() -> Option<ThreadPool> {
    let requested = desired_threads().max(1);
    let try_build = |n| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .thread_name(|i| format!("dyngrid-worker-{}", i))
            .build()
    };

    match try_build(requested) {
        Ok(pool) => Some(pool),
        Err(_) if requested > 1 => try_build(1).ok(),
        Err(_) => None,
    }
}

/// Returns the crate-local pool, if one could be created.
pub(crate) fn rayon_pool() -> Option<&'static ThreadPool> {
    Lazy::force(&RAYON_POOL).as_ref()
}

/// Runs two independent closures, concurrently when a pool is available.
pub(crate) fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    match rayon_pool() {
        Some(pool) => pool.join(a, b),
        None => (a(), b()),
    }
}

// ============================================================================
// STAGE WORKER
// ============================================================================

/// Spawns jobs off the owner thread and hands their results back in order of
/// completion.
pub(crate) struct StageWorker<M> {
    tx: Sender<M>,
    rx: Receiver<M>,
}

impl<M: Send + 'static> StageWorker<M> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        StageWorker { tx, rx }
    }

    /// Runs `job` on the pool; its output is queued for the owner.
    pub(crate) fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> M + Send + 'static,
    {
        let tx = self.tx.clone();
        let task = move || {
            // The receiver lives as long as the grid; a send can only fail
            // while the grid is being dropped.
            let _ = tx.send(job());
        };

        match rayon_pool() {
            Some(pool) => pool.spawn(task),
            None => task(),
        }
    }

    /// Next finished result, without blocking.
    pub(crate) fn try_next(&self) -> Option<M> {
        match self.rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Next finished result, waiting at most `timeout`.
    pub(crate) fn next_timeout(&self, timeout: Duration) -> Option<M> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Next finished result, waiting as long as it takes.
    pub(crate) fn next_blocking(&self) -> Option<M> {
        self.rx.recv().ok()
    }
}
