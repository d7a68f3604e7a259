use bitvec::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::VecDeque;
use std::fmt;

use crate::{
    algorithm::pool::TilePool,
    algorithm::reachability::{reachable_from, validate},
    algorithm::selection::{exterior_constraint, select_candidate, select_entrance},
    io::configuration::{
        ALWAYS_CONNECT, DEFAULT_COLS, DEFAULT_CONNECTION_CHANCE, DEFAULT_ROWS, DEFAULT_SEED,
        MAX_MAP_SIZE, MIN_MAP_SIZE,
    },
    io::error::{DungeonError, Result, WithPosition, assertion_violation, invalid_configuration},
    spatial::connections::{ConnectionMask, Side},
    spatial::grid::Grid,
    spatial::tiles::Tile,
};

/// Parameters of a generation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Map width, 2..=20
    pub cols: usize,
    /// Map height, 2..=20
    pub rows: usize,
    /// Percent chance to open a side towards an unset neighbour
    pub connection_chance: u8,
    /// Seed for the engine's random number generator
    pub seed: u64,
    /// Swap an exit-capable tile into the finished map
    pub place_exit: bool,
    /// Check that every connected cell is reachable from the entrance
    pub validate: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            connection_chance: DEFAULT_CONNECTION_CHANCE,
            seed: DEFAULT_SEED,
            place_exit: false,
            validate: false,
        }
    }
}

impl GenerationConfig {
    /// Check map dimensions
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `cols` or `rows` lies outside 2..=20
    pub fn validate_dimensions(cols: usize, rows: usize) -> Result<()> {
        for (parameter, value) in [("cols", cols), ("rows", rows)] {
            if !(MIN_MAP_SIZE..=MAX_MAP_SIZE).contains(&value) {
                return Err(invalid_configuration(
                    parameter,
                    &value,
                    &format!("sizes must be between {MIN_MAP_SIZE}-{MAX_MAP_SIZE} inclusive"),
                ));
            }
        }
        Ok(())
    }
}

/// Check that a pool can seed a generation
///
/// # Errors
///
/// Returns `InvalidConfiguration` if the pool has no tiles
pub fn validate_pool(pool: &TilePool) -> Result<()> {
    if pool.is_empty() {
        return Err(invalid_configuration(
            "pool",
            &"empty",
            &"usable tiles must be given to the engine",
        ));
    }
    Ok(())
}

/// Stages of a single generation attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Grid cleared and sized
    Reset,
    /// Entrance bound and its neighbours queued
    EntrancePlaced,
    /// Frontier drained
    FrontierExpanded,
    /// Unreached cells filled with the empty tile
    Backfilled,
    /// Exit swapped in
    ExitPlaced,
    /// Reachability confirmed
    Validated,
}

/// Working state of one attempt, committed to the engine only on success
struct Attempt<'p> {
    grid: Grid<'p>,
    frontier: VecDeque<(usize, usize)>,
    queued: BitVec,
    visit_order: Vec<(usize, usize)>,
    entrance: (usize, usize),
    exit: Option<(usize, usize)>,
    stage: Stage,
}

impl<'p> Attempt<'p> {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            grid: Grid::new(cols, rows),
            frontier: VecDeque::new(),
            queued: bitvec![0; cols * rows],
            visit_order: Vec::new(),
            entrance: (0, 0),
            exit: None,
            stage: Stage::Reset,
        }
    }

    /// Queue a cell unless it was queued before
    fn enqueue(&mut self, col: usize, row: usize) {
        let index = self.grid.index_of(col, row);
        if self.queued.get(index).as_deref() == Some(&true) {
            log::trace!("col:{col} row:{row} already queued");
            return;
        }
        self.queued.set(index, true);
        self.frontier.push_back((col, row));
        log::trace!("Queued col:{col} row:{row}");
    }

    fn bind(&mut self, col: usize, row: usize, tile: &'p Tile) -> Result<()> {
        if self.grid.set(col, row, tile) {
            Ok(())
        } else {
            Err(assertion_violation(
                "cell in bounds",
                &format!("col:{col} row:{row} outside the grid"),
            ))
        }
    }
}

/// Frontier-driven map generator
///
/// Owns its grid and random number generator and borrows the tile pool, so
/// several engines can share one pool across threads.
pub struct GenerationEngine<'p> {
    config: GenerationConfig,
    pool: &'p TilePool,
    rng: StdRng,
    grid: Grid<'p>,
    entrance: Option<(usize, usize)>,
    exit: Option<(usize, usize)>,
    visit_order: Vec<(usize, usize)>,
    stage: Stage,
}

impl<'p> GenerationEngine<'p> {
    /// Create an engine, validating its configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for out-of-range dimensions or an
    /// empty pool
    pub fn new(config: GenerationConfig, pool: &'p TilePool) -> Result<Self> {
        GenerationConfig::validate_dimensions(config.cols, config.rows)?;
        validate_pool(pool)?;

        Ok(Self {
            config,
            pool,
            rng: StdRng::seed_from_u64(config.seed),
            grid: Grid::new(config.cols, config.rows),
            entrance: None,
            exit: None,
            visit_order: Vec::new(),
            stage: Stage::Reset,
        })
    }

    /// Generate a new map with the current settings
    ///
    /// On failure the previously generated map is left in place.
    ///
    /// # Errors
    ///
    /// - `NoCandidate` if some cell could not be filled
    /// - `UnreachableSection` if validation finds a cut-off cell
    /// - `AssertionViolation` if backfill is needed but the pool has no empty tile
    pub fn generate(&mut self) -> Result<&Grid<'p>> {
        log::debug!("Generate start...");
        let mut attempt = self.reset()?;
        self.start_generation_at_entrance(&mut attempt)?;
        log::debug!("Entrance placed at {:?}...", attempt.entrance);
        self.place_nodes(&mut attempt)?;
        log::debug!("Node placement complete...");
        self.fill_empty_tiles(&mut attempt)?;
        log::debug!("Filled empty tiles...");

        if self.config.place_exit {
            self.place_exit(&mut attempt)?;
            log::debug!("Exit placed at {:?}...", attempt.exit);
        }
        if self.config.validate || self.config.place_exit {
            validate(&attempt.grid, attempt.entrance, attempt.exit)?;
            attempt.stage = Stage::Validated;
            log::debug!("Reachability validated...");
        }

        self.commit(attempt);
        log::trace!("{self}");
        Ok(&self.grid)
    }

    /// Reconfigure dimensions, connection chance and pool, then generate
    ///
    /// Invalid settings are rejected before anything changes.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for bad settings, otherwise as [`Self::generate`]
    pub fn generate_with(
        &mut self,
        cols: usize,
        rows: usize,
        connection_chance: u8,
        pool: &'p TilePool,
    ) -> Result<&Grid<'p>> {
        GenerationConfig::validate_dimensions(cols, rows)?;
        validate_pool(pool)?;

        self.config.cols = cols;
        self.config.rows = rows;
        self.config.connection_chance = connection_chance;
        self.pool = pool;
        self.generate()
    }

    /// Overwrite one cell without any connection checks
    ///
    /// Returns false if `(col, row)` is outside the map.
    pub fn swap_tile(&mut self, col: usize, row: usize, tile: &'p Tile) -> bool {
        self.grid.set(col, row, tile)
    }

    /// Most recently generated map
    pub const fn grid(&self) -> &Grid<'p> {
        &self.grid
    }

    /// Current settings
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Percent chance of connecting towards an unset neighbour
    pub const fn connection_chance(&self) -> u8 {
        self.config.connection_chance
    }

    /// Pool the engine draws from
    pub const fn pool(&self) -> &'p TilePool {
        self.pool
    }

    /// Entrance cell of the last successful generation
    pub const fn entrance(&self) -> Option<(usize, usize)> {
        self.entrance
    }

    /// Exit cell of the last successful generation, if one was placed
    pub const fn exit(&self) -> Option<(usize, usize)> {
        self.exit
    }

    /// Cells in the order the frontier visited them, entrance excluded
    pub fn visit_order(&self) -> &[(usize, usize)] {
        &self.visit_order
    }

    /// Last stage reached by a successful generation
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    fn reset(&self) -> Result<Attempt<'p>> {
        GenerationConfig::validate_dimensions(self.config.cols, self.config.rows)?;
        validate_pool(self.pool)?;
        log::trace!("Map reset to {}x{}", self.config.cols, self.config.rows);
        Ok(Attempt::new(self.config.cols, self.config.rows))
    }

    /// Place a random entrance and queue the cells it opens onto
    fn start_generation_at_entrance(&mut self, attempt: &mut Attempt<'p>) -> Result<()> {
        let (cols, rows) = (self.config.cols, self.config.rows);
        let ent_col = self.rng.random_range(0..cols);
        let ent_row = self.rng.random_range(0..rows);

        let pool = self.pool;
        let possible = exterior_constraint(ent_col, ent_row, cols, rows);
        let chosen = select_entrance(possible, pool.entrances(), &mut self.rng)
            .with_position(ent_col, ent_row)?;

        attempt.bind(ent_col, ent_row, chosen)?;
        attempt.entrance = (ent_col, ent_row);
        attempt.queued.set(attempt.grid.index_of(ent_col, ent_row), true);

        for side in Side::ALL {
            if !chosen.connections().has_side(side) {
                continue;
            }
            if let Some((n_col, n_row)) = attempt.grid.neighbour(ent_col, ent_row, side) {
                attempt.enqueue(n_col, n_row);
            }
        }

        attempt.stage = Stage::EntrancePlaced;
        Ok(())
    }

    /// Drain the frontier, filling each cell from the full pool
    fn place_nodes(&mut self, attempt: &mut Attempt<'p>) -> Result<()> {
        let pool = self.pool;
        while let Some((col, row)) = attempt.frontier.pop_front() {
            log::trace!("Visiting col:{col} row:{row}");
            attempt.visit_order.push((col, row));

            let (required, possible) = self.calculate_connections(attempt, col, row);
            let chosen = select_candidate(required, possible, pool.tiles(), &mut self.rng)
                .with_position(col, row)?;
            attempt.bind(col, row, chosen)?;
        }

        attempt.stage = Stage::FrontierExpanded;
        Ok(())
    }

    /// Gather required and possible connections for a cell
    ///
    /// Bound neighbours dictate the touching side. Unset neighbours are
    /// connected on a successful chance roll and queued for a visit.
    fn calculate_connections(
        &mut self,
        attempt: &mut Attempt<'p>,
        col: usize,
        row: usize,
    ) -> (ConnectionMask, ConnectionMask) {
        let mut required = ConnectionMask::ZERO;
        let mut possible = ConnectionMask::ZERO;

        for side in Side::ALL {
            let Some((n_col, n_row)) = attempt.grid.neighbour(col, row, side) else {
                continue;
            };

            if let Some(neighbour) = attempt.grid.get(n_col, n_row) {
                required.set_side(side, neighbour.connections().mirrored_side(side.opposite()));
            } else if self.roll_connection() {
                possible.set_side(side, ConnectionMask::SIDE_FULL);
                attempt.enqueue(n_col, n_row);
            } else {
                log::trace!("Skipping neighbour at col:{n_col} row:{n_row}");
            }
        }

        log::trace!(
            "Setting connections, possible mask = [{:#010x}], required mask = [{:#010x}]",
            possible.bits(),
            required.bits()
        );
        (required, possible)
    }

    fn roll_connection(&mut self) -> bool {
        let chance = self.config.connection_chance;
        chance >= ALWAYS_CONNECT || self.rng.random_range(1..=100) <= chance
    }

    /// Bind the empty tile to every cell the frontier never reached
    fn fill_empty_tiles(&self, attempt: &mut Attempt<'p>) -> Result<()> {
        let unset = attempt.grid.unset_cells();
        if unset.is_empty() {
            attempt.stage = Stage::Backfilled;
            return Ok(());
        }

        let pool = self.pool;
        let empty = pool.empty_tile().ok_or_else(|| {
            assertion_violation(
                "empty tile configured",
                &format!("{} unset cells remain but the pool has no empty tile", unset.len()),
            )
        })?;
        for (col, row) in unset {
            attempt.bind(col, row, empty)?;
        }

        attempt.stage = Stage::Backfilled;
        Ok(())
    }

    /// Swap an exit tile with an identical mask into a reachable cell
    fn place_exit(&mut self, attempt: &mut Attempt<'p>) -> Result<()> {
        let pool = self.pool;
        let reachable = reachable_from(&attempt.grid, attempt.entrance);
        let sites: Vec<(usize, usize)> = attempt
            .grid
            .cells()
            .filter(|&(col, row, tile)| {
                (col, row) != attempt.entrance
                    && reachable.get(attempt.grid.index_of(col, row)).as_deref() == Some(&true)
                    && tile.is_some_and(|t| {
                        pool.exits()
                            .any(|exit| exit.connections() == t.connections())
                    })
            })
            .map(|(col, row, _)| (col, row))
            .collect();

        if sites.is_empty() {
            return Err(DungeonError::NoCandidate {
                required: ConnectionMask::ZERO,
                possible: ConnectionMask::ZERO,
                position: Some(attempt.entrance),
            });
        }

        let (col, row) = sites
            .get(self.rng.random_range(0..sites.len()))
            .copied()
            .ok_or_else(|| assertion_violation("exit site in range", &sites.len()))?;
        let mask = attempt
            .grid
            .get(col, row)
            .map(Tile::connections)
            .ok_or_else(|| assertion_violation("exit site bound", &format!("{col},{row}")))?;

        let exit = select_candidate(mask, ConnectionMask::ZERO, pool.exits(), &mut self.rng)
            .with_position(col, row)?;
        attempt.bind(col, row, exit)?;
        attempt.exit = Some((col, row));
        attempt.stage = Stage::ExitPlaced;
        Ok(())
    }

    fn commit(&mut self, attempt: Attempt<'p>) {
        self.grid = attempt.grid;
        self.entrance = Some(attempt.entrance);
        self.exit = attempt.exit;
        self.visit_order = attempt.visit_order;
        self.stage = attempt.stage;
    }
}

impl fmt::Display for GenerationEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- - - Map Info: - - -")?;
        if let Some(theme) = self.pool.tiles().next().map(Tile::theme) {
            writeln!(f, "\tTheme: {theme}")?;
        }
        writeln!(f, "\tColumns: {}", self.grid.cols())?;
        writeln!(f, "\tRows: {}", self.grid.rows())?;
        writeln!(f, "\tConnection Chance: {}", self.config.connection_chance)?;
        writeln!(f, "- - - Connections - - -")?;
        write!(f, "{}", self.grid.connection_layout())?;
        writeln!(f, "- - - - - - - - - - - -")
    }
}
