//! Command-line interface for generating dungeon maps from a tile directory

use crate::algorithm::coverage::{CoverageReport, run_coverage};
use crate::algorithm::executor::{GenerationConfig, GenerationEngine};
use crate::io::configuration::{
    DEFAULT_ATTEMPTS, DEFAULT_COLS, DEFAULT_CONNECTION_CHANCE, DEFAULT_COVERAGE_ITERATIONS,
    DEFAULT_MAP_COUNT, DEFAULT_OUTPUT_DIR, DEFAULT_ROWS, DEFAULT_SEED, OUTPUT_EXTENSION,
};
use crate::io::error::{Result, invalid_configuration};
use crate::io::image::export_grid;
use crate::io::loader::{TileLibrary, export_loaded, load_tiles, prepare_directories};
use crate::io::logging::ProgressLogger;
use crate::io::progress::ProgressManager;
use crate::spatial::tiles::TileIdAllocator;
use clap::Parser;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "dungeontile")]
#[command(
    author,
    version,
    about = "Assemble dungeon maps from connector-tagged tile images"
)]
/// Command-line arguments for the map generator
// Each flag toggles an independent feature of the run
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Directory of tile images named `name;theme;connections;entrance;exit;permutable;flippable`
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Map width in tiles (2-20)
    #[arg(short, long, default_value_t = DEFAULT_COLS)]
    pub cols: usize,

    /// Map height in tiles (2-20)
    #[arg(short, long, default_value_t = DEFAULT_ROWS)]
    pub rows: usize,

    /// Percent chance to open a side towards an unvisited cell (100 = always)
    #[arg(short = 'p', long, default_value_t = DEFAULT_CONNECTION_CHANCE)]
    pub chance: u8,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of maps to write
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAP_COUNT)]
    pub count: usize,

    /// Generation attempts per map before giving up
    #[arg(short, long, default_value_t = DEFAULT_ATTEMPTS)]
    pub attempts: usize,

    /// Directory the maps are written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Also write every loaded tile image, variants included, to this directory
    #[arg(long, value_name = "DIR")]
    pub loaded: Option<PathBuf>,

    /// Place an exit tile in every map (implies --validate)
    #[arg(short, long)]
    pub exit: bool,

    /// Reject maps with cells unreachable from the entrance
    #[arg(long)]
    pub validate: bool,

    /// Run the coverage harness on N worker threads instead of writing maps
    #[arg(long, value_name = "N")]
    pub coverage: Option<usize>,

    /// Generations per coverage worker
    #[arg(short, long, default_value_t = DEFAULT_COVERAGE_ITERATIONS)]
    pub iterations: usize,

    /// Suppress progress output and informational logs
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log every generation stage
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Log level selected by `--quiet` / `--verbose`
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Warn
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Engine settings selected by the arguments
    pub const fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            cols: self.cols,
            rows: self.rows,
            connection_chance: self.chance,
            seed: self.seed,
            place_exit: self.exit,
            validate: self.validate,
        }
    }

    /// Path of the `index`-th map
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output.join(format!("map_{index}.{OUTPUT_EXTENSION}"))
    }
}

/// Orchestrates loading, generation and export with progress tracking
pub struct MapRunner {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl MapRunner {
    /// Create a runner for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Install the global logger at the level the arguments select
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a logger is already installed
    pub fn install_logger(&self) -> Result<()> {
        let progress = self
            .progress_manager
            .as_ref()
            .map(ProgressManager::multi_progress);
        ProgressLogger::new(self.cli.log_level(), progress).install()
    }

    /// Run according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the tile directory is missing or empty, loading
    /// fails, a map exhausts its attempts, an export fails, or the coverage
    /// harness fails
    pub fn process(&mut self) -> Result<()> {
        let mut writable: Vec<&Path> = self.cli.loaded.iter().map(PathBuf::as_path).collect();
        if self.cli.coverage.is_none() {
            writable.push(&self.cli.output);
        }
        prepare_directories(&self.cli.target, &writable)?;

        let ids = TileIdAllocator::new();
        let library = load_tiles(&self.cli.target, &ids)?;
        if let Some(ref dir) = self.cli.loaded {
            export_loaded(&library, dir)?;
        }

        match self.cli.coverage {
            Some(workers) => {
                self.run_coverage(&library, workers)?;
            }
            None => self.write_maps(&library)?,
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }
        Ok(())
    }

    fn write_maps(&mut self, library: &TileLibrary) -> Result<()> {
        if self.cli.attempts == 0 {
            return Err(invalid_configuration(
                "attempts",
                &self.cli.attempts,
                &"at least one attempt is required",
            ));
        }

        let start_time = Instant::now();
        let mut engine = GenerationEngine::new(self.cli.generation_config(), library.pool())?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_maps(self.cli.count);
        }

        for index in 0..self.cli.count {
            self.generate_one(&mut engine, index)?;
            let path = self.cli.output_path(index);
            export_grid(engine.grid(), library, &path)?;
            log::info!("Wrote '{}'", path.display());

            if let Some(ref pm) = self.progress_manager {
                pm.complete_map();
            }
        }

        log::info!(
            "Generated {} maps in {:.2}s",
            self.cli.count,
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Generate until success or the attempt budget is spent
    fn generate_one(&mut self, engine: &mut GenerationEngine<'_>, index: usize) -> Result<()> {
        let mut attempt = 1;
        loop {
            match engine.generate() {
                Ok(_) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.cli.attempts => {
                    log::debug!("Map {index} attempt {attempt} failed: {e}");
                    if let Some(ref mut pm) = self.progress_manager {
                        pm.retry();
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn run_coverage(&mut self, library: &TileLibrary, workers: usize) -> Result<CoverageReport> {
        let bar = self
            .progress_manager
            .as_mut()
            .map(|pm| pm.start_coverage(workers.saturating_mul(self.cli.iterations)));

        let report = run_coverage(
            library.pool(),
            self.cli.generation_config(),
            workers,
            self.cli.iterations,
            bar.as_ref(),
        )?;

        log::info!(
            "Success rate {:.1}% ({} no candidate, {} unreachable), tile coverage {:.1}%",
            report.success_rate() * 100.0,
            report.no_candidate,
            report.unreachable,
            report.ratio() * 100.0
        );
        for id in &report.missing {
            if let Some(tile) = library.pool().get(*id) {
                log::warn!("Tile never placed: {tile}");
            }
        }
        Ok(report)
    }
}
