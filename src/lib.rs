//! Connection-constrained tile placement for procedural dungeon maps
//!
//! Tiles carry eight connectors on each of their four edges. Maps are grown
//! outward from a randomly placed entrance, every new tile matching the
//! connectors of the tiles already around it, until the frontier runs dry and
//! the untouched cells are filled with an empty tile.

#![forbid(unsafe_code)]

/// Generation engine, tile pool, permutations, selection and reachability
pub mod algorithm;
/// Tile loading, map export, command line and error handling
pub mod io;
/// Connector masks, tiles and the map grid
pub mod spatial;

pub use io::error::{DungeonError, Result};
