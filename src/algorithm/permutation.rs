//! Rotated and mirrored tile variants
//!
//! A permutable base tile yields its quarter-turn rotations; a flippable one
//! additionally yields its mirror image and the mirror's rotations. Variants
//! whose mask would repeat under a half turn are skipped.

use crate::io::error::{DungeonError, Result};
use crate::spatial::connections::ConnectionMask;
use crate::spatial::tiles::{Rotation, Tile, TileIdAllocator};

/// Most variants derived from a rotation-only tile
pub const MAX_PERMUTATIONS: usize = 3;
/// Most variants derived from a flippable tile
pub const MAX_FLIPPABLE_PERMUTATIONS: usize = 7;

/// Derives variant tiles, drawing ids from a shared allocator
#[derive(Debug, Clone, Copy)]
pub struct TilePermuter<'a> {
    ids: &'a TileIdAllocator,
}

impl<'a> TilePermuter<'a> {
    /// Permuter allocating variant ids from `ids`
    pub const fn new(ids: &'a TileIdAllocator) -> Self {
        Self { ids }
    }

    /// All variants of `base`, each with a fresh id
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `base` is not permutable
    pub fn permute(&self, base: &Tile) -> Result<Vec<Tile>> {
        if !base.is_permutable() {
            return Err(DungeonError::InvalidArgument {
                reason: format!("tile '{}' (id {}) is not permutable", base.name(), base.id()),
            });
        }

        let capacity = if base.is_flippable() {
            MAX_FLIPPABLE_PERMUTATIONS
        } else {
            MAX_PERMUTATIONS
        };
        let mut variants = Vec::with_capacity(capacity);

        self.push_rotations(base, base.connections(), false, &mut variants);

        if base.is_flippable() {
            let flipped = base.connections().flip_horizontal();
            variants.push(Tile::derived(
                base,
                self.ids.allocate(),
                flipped,
                Rotation::None,
                true,
            ));
            self.push_rotations(base, flipped, true, &mut variants);
        }

        log::trace!(
            "Permuted tile '{}' into {} variants",
            base.name(),
            variants.len()
        );
        Ok(variants)
    }

    fn push_rotations(
        &self,
        base: &Tile,
        mask: ConnectionMask,
        flipped: bool,
        variants: &mut Vec<Tile>,
    ) {
        let skip_half_turn = mask.is_half_turn_symmetric();
        for rotation in Rotation::TURNS {
            if skip_half_turn && rotation == Rotation::Half {
                continue;
            }
            variants.push(Tile::derived(
                base,
                self.ids.allocate(),
                mask.rotate(rotation.quarter_turns()),
                rotation,
                flipped,
            ));
        }
    }
}
