//! Progress display for batch map generation and coverage runs

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static MAP_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let template = format!(
        "[{{elapsed_precise}}] Maps: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
    );
    ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static COVERAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let template = format!(
        "[{{elapsed_precise}}] Generations: [{{bar:{PROGRESS_BAR_WIDTH}.green/blue}}] {{pos}}/{{len}}"
    );
    ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates the progress bars of one run
///
/// The [`MultiProgress`] handle is shared with the logger so that log lines
/// are printed above the bars instead of through them.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    map_bar: Option<ProgressBar>,
    coverage_bar: Option<ProgressBar>,
    failed_attempts: usize,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            map_bar: None,
            coverage_bar: None,
            failed_attempts: 0,
        }
    }

    /// Handle for the logger
    pub fn multi_progress(&self) -> MultiProgress {
        self.multi_progress.clone()
    }

    /// Show a bar for writing `count` maps
    pub fn start_maps(&mut self, count: usize) {
        let bar = ProgressBar::new(count as u64);
        bar.set_style(MAP_STYLE.clone());
        self.map_bar = Some(self.multi_progress.add(bar));
    }

    /// Count a failed attempt that will be retried
    pub fn retry(&mut self) {
        self.failed_attempts += 1;
        if let Some(ref bar) = self.map_bar {
            bar.set_message(format!("({} retries)", self.failed_attempts));
        }
    }

    /// Count one written map
    pub fn complete_map(&self) {
        if let Some(ref bar) = self.map_bar {
            bar.inc(1);
        }
    }

    /// Show a bar for `total` coverage generations and return it for workers
    pub fn start_coverage(&mut self, total: usize) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(COVERAGE_STYLE.clone());
        let bar = self.multi_progress.add(bar);
        self.coverage_bar = Some(bar.clone());
        bar
    }

    /// Number of retried attempts so far
    pub const fn failed_attempts(&self) -> usize {
        self.failed_attempts
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref bar) = self.map_bar {
            bar.finish_with_message("All maps written");
        }
        if let Some(ref bar) = self.coverage_bar {
            bar.finish();
        }
        let _ = self.multi_progress.clear();
    }
}
