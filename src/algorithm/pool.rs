//! Registry of tiles available to generation
//!
//! The pool is assembled once through [`TilePoolBuilder`] and is read-only
//! afterwards. Tiles are kept in id order so that a seeded engine makes the
//! same choices on every run.

use std::collections::BTreeMap;

use crate::algorithm::permutation::TilePermuter;
use crate::io::error::{DungeonError, Result, assertion_violation};
use crate::spatial::tiles::{Tile, TileFlags, TileId};

/// Immutable set of tiles partitioned by capability
#[derive(Debug, Clone, Default)]
pub struct TilePool {
    tiles: BTreeMap<TileId, Tile>,
    entrances: Vec<TileId>,
    exits: Vec<TileId>,
    empty: Option<Tile>,
}

impl TilePool {
    /// Start building a pool
    pub fn builder() -> TilePoolBuilder {
        TilePoolBuilder::default()
    }

    /// Number of tiles in the full set
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if the full set has no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Look a tile up by id, including the empty tile
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles
            .get(&id)
            .or_else(|| self.empty.as_ref().filter(|empty| empty.id() == id))
    }

    /// Every tile in id order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.values()
    }

    /// Entrance-capable tiles in id order
    pub fn entrances(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.entrances.iter().filter_map(|id| self.tiles.get(id))
    }

    /// Exit-capable tiles in id order
    pub fn exits(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.exits.iter().filter_map(|id| self.tiles.get(id))
    }

    /// Designated backfill tile, if one was configured
    pub const fn empty_tile(&self) -> Option<&Tile> {
        self.empty.as_ref()
    }

    /// Number of entrance-capable tiles
    pub fn entrance_count(&self) -> usize {
        self.entrances.len()
    }

    /// Number of exit-capable tiles
    pub fn exit_count(&self) -> usize {
        self.exits.len()
    }
}

/// Staging area for a [`TilePool`]
///
/// Nothing becomes visible until [`TilePoolBuilder::build`] succeeds, so a
/// failed insertion never leaves a half-filled pool behind.
#[derive(Debug, Default)]
pub struct TilePoolBuilder {
    tiles: BTreeMap<TileId, Tile>,
    empty: Option<Tile>,
}

impl TilePoolBuilder {
    /// Add a single tile
    ///
    /// # Errors
    ///
    /// Returns `AssertionViolation` if a tile with the same id was already
    /// added, which means two allocators were mixed
    pub fn insert(&mut self, tile: Tile) -> Result<&mut Self> {
        let id = tile.id();
        if self.tiles.contains_key(&id) || self.empty.as_ref().is_some_and(|e| e.id() == id) {
            return Err(assertion_violation(
                "unique tile id",
                &format!("tile id {id} inserted twice ('{}')", tile.name()),
            ));
        }
        self.tiles.insert(id, tile);
        Ok(self)
    }

    /// Add a tile and, if it is permutable, all of its variants
    ///
    /// # Errors
    ///
    /// Propagates permutation failures and duplicate id violations
    pub fn insert_with_permutations(
        &mut self,
        tile: Tile,
        permuter: &TilePermuter<'_>,
    ) -> Result<&mut Self> {
        let variants = if tile.is_permutable() {
            permuter.permute(&tile)?
        } else {
            Vec::new()
        };
        self.insert(tile)?;
        for variant in variants {
            self.insert(variant)?;
        }
        Ok(self)
    }

    /// Designate the tile used to backfill unreached cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the tile has connectors or any flag set,
    /// and `AssertionViolation` if its id is already in the pool
    pub fn empty_tile(&mut self, tile: Tile) -> Result<&mut Self> {
        if !tile.connections().is_empty() || tile.flags() != TileFlags::default() {
            return Err(DungeonError::InvalidArgument {
                reason: format!(
                    "empty tile '{}' must have no connections and no flags",
                    tile.name()
                ),
            });
        }
        if self.tiles.contains_key(&tile.id()) {
            return Err(assertion_violation(
                "unique tile id",
                &format!("empty tile id {} already in the pool", tile.id()),
            ));
        }
        self.empty = Some(tile);
        Ok(self)
    }

    /// True once a backfill tile has been designated
    pub const fn has_empty_tile(&self) -> bool {
        self.empty.is_some()
    }

    /// Freeze the staged tiles into a pool
    pub fn build(self) -> TilePool {
        let entrances = self
            .tiles
            .values()
            .filter(|tile| tile.is_entrance())
            .map(Tile::id)
            .collect();
        let exits = self
            .tiles
            .values()
            .filter(|tile| tile.is_exit())
            .map(Tile::id)
            .collect();

        TilePool {
            tiles: self.tiles,
            entrances,
            exits,
            empty: self.empty,
        }
    }
}
