//! `log` backend that cooperates with progress bars
//!
//! Records are written to stderr through [`MultiProgress::suspend`] when a
//! progress display is active, so log lines never tear a bar mid-draw.

use indicatif::MultiProgress;
use log::{LevelFilter, Log, Metadata, Record};

use crate::io::error::{Result, invalid_configuration};

/// Stderr logger aware of an optional progress display
pub struct ProgressLogger {
    level: LevelFilter,
    progress: Option<MultiProgress>,
}

impl ProgressLogger {
    /// Logger emitting records up to `level`
    pub const fn new(level: LevelFilter, progress: Option<MultiProgress>) -> Self {
        Self { level, progress }
    }

    /// Install as the global logger
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a logger is already installed
    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))
            .map(|()| log::set_max_level(level))
            .map_err(|e| invalid_configuration("logger", &level, &e))
    }

    /// Render a record the way it is written
    pub fn format(record: &Record<'_>) -> String {
        format!(
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for ProgressLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    // Logging is this type's purpose
    #[allow(clippy::print_stderr)]
    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format(record);
        match &self.progress {
            Some(progress) => progress.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }

    fn flush(&self) {}
}
