//! Spatial data structures for tiles and maps
//!
//! This module contains spatial-related functionality including:
//! - Connector bitmask algebra for tile edges
//! - Tile records and id allocation
//! - Map grid storage and diagnostics

/// Connector bitmask algebra
pub mod connections;
/// Map grid storage and connector diagnostics
pub mod grid;
/// Tile records and id allocation
pub mod tiles;

pub use connections::{ConnectionMask, Side};
pub use grid::Grid;
pub use tiles::{Tile, TileId, TileIdAllocator};
