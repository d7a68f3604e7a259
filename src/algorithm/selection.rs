use crate::io::error::{DungeonError, Result};
use crate::spatial::connections::{ConnectionMask, Side};
use crate::spatial::tiles::Tile;
use rand::Rng;

/// Check whether a tile mask satisfies the accumulated cell constraints
///
/// With no `possible` sides the tile must equal `required` exactly. Otherwise
/// each side is checked independently: a non-zero required value must be
/// matched exactly, a side that is neither required nor possible must be
/// closed, and an open possible side needs at least one of its connectors.
/// The last rule keeps every queued neighbour attached to the cell that
/// queued it.
pub const fn is_candidate(
    mask: ConnectionMask,
    required: ConnectionMask,
    possible: ConnectionMask,
) -> bool {
    if possible.is_empty() {
        return mask.bits() == required.bits();
    }

    let mut i = 0;
    while i < Side::ALL.len() {
        let side = Side::ALL[i];
        let value = mask.side(side);
        let needed = required.side(side);
        let open = possible.side(side);

        if needed != 0 {
            if value != needed {
                return false;
            }
        } else if value & !open != 0 || (open != 0 && value == 0) {
            return false;
        }
        i += 1;
    }
    true
}

/// Check that a tile opens only towards `possible` sides
///
/// Used for the entrance, which has no neighbours to honour yet and may
/// leave any allowed side closed.
pub const fn fits_within(mask: ConnectionMask, possible: ConnectionMask) -> bool {
    mask.bits() & !possible.bits() == 0
}

/// Pick uniformly among the tiles satisfying `required` and `possible`
///
/// Candidates are considered in iteration order, which makes the choice
/// reproducible for a seeded `rng`.
///
/// # Errors
///
/// Returns `NoCandidate` if no tile satisfies the constraints
pub fn select_candidate<'p, R>(
    required: ConnectionMask,
    possible: ConnectionMask,
    tiles: impl IntoIterator<Item = &'p Tile>,
    rng: &mut R,
) -> Result<&'p Tile>
where
    R: Rng + ?Sized,
{
    let candidates = tiles
        .into_iter()
        .filter(|tile| is_candidate(tile.connections(), required, possible));
    pick_uniform(candidates, required, possible, rng)
}

/// Pick uniformly among entrance tiles opening only towards `possible`
///
/// # Errors
///
/// Returns `NoCandidate` with an empty required mask if every tile opens
/// towards a forbidden side
pub fn select_entrance<'p, R>(
    possible: ConnectionMask,
    tiles: impl IntoIterator<Item = &'p Tile>,
    rng: &mut R,
) -> Result<&'p Tile>
where
    R: Rng + ?Sized,
{
    let candidates = tiles
        .into_iter()
        .filter(|tile| fits_within(tile.connections(), possible));
    pick_uniform(candidates, ConnectionMask::ZERO, possible, rng)
}

fn pick_uniform<'p, R>(
    candidates: impl Iterator<Item = &'p Tile>,
    required: ConnectionMask,
    possible: ConnectionMask,
    rng: &mut R,
) -> Result<&'p Tile>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<&'p Tile> = candidates.collect();
    let no_candidate = DungeonError::NoCandidate {
        required,
        possible,
        position: None,
    };
    if candidates.is_empty() {
        return Err(no_candidate);
    }

    let index = rng.random_range(0..candidates.len());
    candidates.get(index).copied().ok_or(no_candidate)
}

/// Connection constraints forced on a cell by the map border
///
/// Returns the `possible` mask for a cell at `(col, row)`: every side is
/// open except those facing out of a `cols x rows` grid.
pub const fn exterior_constraint(
    col: usize,
    row: usize,
    cols: usize,
    rows: usize,
) -> ConnectionMask {
    let mut possible = ConnectionMask::FULL;
    if col == 0 {
        possible = possible.with_side(Side::Left, 0);
    }
    if col + 1 == cols {
        possible = possible.with_side(Side::Right, 0);
    }
    if row == 0 {
        possible = possible.with_side(Side::Top, 0);
    }
    if row + 1 == rows {
        possible = possible.with_side(Side::Bottom, 0);
    }
    possible
}
