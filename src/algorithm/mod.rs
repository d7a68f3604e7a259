/// Parallel coverage runs over a shared tile pool
pub mod coverage;
/// Generation engine and its configuration
pub mod executor;
/// Rotated and mirrored tile variants
pub mod permutation;
/// Registry of tiles available to generation
pub mod pool;
/// Connectivity checks over a generated map
pub mod reachability;
/// Constraint filtering and uniform tile selection
pub mod selection;
