//! Generation constants and runtime configuration defaults

// Map size limits, inclusive on both ends
/// Smallest allowed width or height of a map
pub const MIN_MAP_SIZE: usize = 2;
/// Largest allowed width or height of a map
pub const MAX_MAP_SIZE: usize = 20;

/// Connection chance at or above which every open neighbour is connected
pub const ALWAYS_CONNECT: u8 = 100;

// Default values for configurable parameters
/// Default map width
pub const DEFAULT_COLS: usize = 3;
/// Default map height
pub const DEFAULT_ROWS: usize = 3;
/// Default percentage chance of opening a side towards an unset neighbour
pub const DEFAULT_CONNECTION_CHANCE: u8 = 50;
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;
/// Default number of maps written per run
pub const DEFAULT_MAP_COUNT: usize = 1;
/// Attempts per map before a retryable failure is reported
pub const DEFAULT_ATTEMPTS: usize = 25;
/// Generations per worker during a coverage run
pub const DEFAULT_COVERAGE_ITERATIONS: usize = 100;

// Tile descriptors
/// Number of `;`-separated fields in a tile descriptor
pub const DESCRIPTOR_FIELD_COUNT: usize = 7;
/// Tile name reserved for the backfill tile
pub const EMPTY_TILE_NAME: &str = "empty";
/// Image extensions picked up when scanning a tile directory
pub const TILE_IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

// Output settings
/// Default directory for composed maps
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// Extension of composed map images
pub const OUTPUT_EXTENSION: &str = "png";
