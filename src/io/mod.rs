/// Command-line arguments and the map runner
pub mod cli;
/// Compile-time limits and defaults
pub mod configuration;
/// Tile metadata encoded in image file names
pub mod descriptor;
/// Error type shared by every layer
pub mod error;
/// Map composition and export
pub mod image;
/// Tile directory loading
pub mod loader;
/// Logger that prints around progress bars
pub mod logging;
/// Progress bars for map batches and coverage runs
pub mod progress;
