//! Parallel generation runs tracking which tiles get used
//!
//! Each worker thread owns its own engine; the pool is shared read-only. The
//! set of exercised tile ids is the only shared mutable state and is guarded
//! by a mutex around every update.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::ProgressBar;

use crate::algorithm::executor::{GenerationConfig, GenerationEngine};
use crate::algorithm::pool::TilePool;
use crate::io::error::{DungeonError, Result, assertion_violation, invalid_configuration};
use crate::spatial::grid::Grid;
use crate::spatial::tiles::TileId;

/// Thread-safe record of tile ids placed across many generations
#[derive(Debug, Default)]
pub struct CoverageTracker {
    seen: Mutex<BTreeSet<TileId>>,
}

impl CoverageTracker {
    /// Tracker with nothing recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every tile bound in `grid`
    ///
    /// # Errors
    ///
    /// Returns `AssertionViolation` if another worker panicked while holding
    /// the lock
    pub fn record(&self, grid: &Grid<'_>) -> Result<()> {
        let mut seen = self
            .seen
            .lock()
            .map_err(|e| assertion_violation("coverage lock", &e))?;
        seen.extend(grid.cells().filter_map(|(_, _, tile)| tile.map(|t| t.id())));
        Ok(())
    }

    /// Snapshot of the ids recorded so far
    ///
    /// # Errors
    ///
    /// Returns `AssertionViolation` if the lock is poisoned
    pub fn seen(&self) -> Result<BTreeSet<TileId>> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .map_err(|e| assertion_violation("coverage lock", &e))
    }

    /// Pool tiles placed at least once
    ///
    /// The backfill tile sits outside the pool's selection set and is never
    /// counted.
    ///
    /// # Errors
    ///
    /// Returns `AssertionViolation` if the lock is poisoned
    pub fn covered(&self, pool: &TilePool) -> Result<BTreeSet<TileId>> {
        let seen = self.seen()?;
        Ok(pool
            .tiles()
            .map(|tile| tile.id())
            .filter(|id| seen.contains(id))
            .collect())
    }

    /// Pool tiles that have not been placed yet, in id order
    ///
    /// # Errors
    ///
    /// Returns `AssertionViolation` if the lock is poisoned
    pub fn missing(&self, pool: &TilePool) -> Result<Vec<TileId>> {
        let seen = self.seen()?;
        Ok(pool
            .tiles()
            .map(|tile| tile.id())
            .filter(|id| !seen.contains(id))
            .collect())
    }
}

/// Outcome of a coverage run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    /// Generations attempted across all workers
    pub attempts: usize,
    /// Generations that produced a map
    pub successes: usize,
    /// Attempts that hit a dead end during selection
    pub no_candidate: usize,
    /// Attempts rejected by reachability validation
    pub unreachable: usize,
    /// Distinct pool tile ids placed at least once
    pub seen: BTreeSet<TileId>,
    /// Pool tiles never placed
    pub missing: Vec<TileId>,
}

impl CoverageReport {
    /// Share of pool tiles that were placed, in 0.0..=1.0
    pub fn ratio(&self) -> f64 {
        let total = self.seen.len() + self.missing.len();
        if total == 0 {
            return 1.0;
        }
        self.seen.len() as f64 / total as f64
    }

    /// Share of attempts that produced a map, in 0.0..=1.0
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 1.0;
        }
        self.successes as f64 / self.attempts as f64
    }
}

#[derive(Default)]
struct Counters {
    attempts: AtomicUsize,
    successes: AtomicUsize,
    no_candidate: AtomicUsize,
    unreachable: AtomicUsize,
}

/// Run `iterations` generations on each of `workers` threads
///
/// Worker `w` seeds its engine with `config.seed + w`. Retryable failures are
/// counted and the worker moves on; any other error stops the run.
///
/// # Errors
///
/// - `InvalidConfiguration` for zero workers, bad dimensions or an empty pool
/// - the first non-retryable error raised by any worker
pub fn run_coverage(
    pool: &TilePool,
    config: GenerationConfig,
    workers: usize,
    iterations: usize,
    progress: Option<&ProgressBar>,
) -> Result<CoverageReport> {
    if workers == 0 {
        return Err(invalid_configuration(
            "workers",
            &workers,
            &"at least one worker is required",
        ));
    }
    // Surface configuration errors before spawning anything
    GenerationEngine::new(config, pool)?;

    let tracker = CoverageTracker::new();
    let counters = Counters::default();

    let outcomes: Vec<Result<()>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let tracker = &tracker;
                let counters = &counters;
                let worker_config = GenerationConfig {
                    seed: config.seed.wrapping_add(worker as u64),
                    ..config
                };
                scope.spawn(move || {
                    run_worker(pool, worker_config, iterations, tracker, counters, progress)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(assertion_violation("worker", &"worker panicked")))
            })
            .collect()
    });

    for outcome in outcomes {
        outcome?;
    }

    let report = CoverageReport {
        attempts: counters.attempts.load(Ordering::Relaxed),
        successes: counters.successes.load(Ordering::Relaxed),
        no_candidate: counters.no_candidate.load(Ordering::Relaxed),
        unreachable: counters.unreachable.load(Ordering::Relaxed),
        seen: tracker.covered(pool)?,
        missing: tracker.missing(pool)?,
    };
    log::info!(
        "Coverage: {}/{} generations succeeded, {} of {} tiles placed",
        report.successes,
        report.attempts,
        report.seen.len(),
        pool.len()
    );
    Ok(report)
}

fn run_worker(
    pool: &TilePool,
    config: GenerationConfig,
    iterations: usize,
    tracker: &CoverageTracker,
    counters: &Counters,
    progress: Option<&ProgressBar>,
) -> Result<()> {
    let mut engine = GenerationEngine::new(config, pool)?;

    for _ in 0..iterations {
        counters.attempts.fetch_add(1, Ordering::Relaxed);
        match engine.generate() {
            Ok(grid) => {
                tracker.record(grid)?;
                counters.successes.fetch_add(1, Ordering::Relaxed);
            }
            Err(DungeonError::NoCandidate { .. }) => {
                counters.no_candidate.fetch_add(1, Ordering::Relaxed);
            }
            Err(DungeonError::UnreachableSection { .. }) => {
                counters.unreachable.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => return Err(error),
        }
        if let Some(bar) = progress {
            bar.inc(1);
        }
    }

    Ok(())
}
