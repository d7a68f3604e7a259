//! Connectivity checks over a generated map
//!
//! Two neighbouring cells are linked when both of their touching sides carry
//! connectors. Validation walks these links breadth-first from the entrance.

use bitvec::prelude::*;
use std::collections::VecDeque;

use crate::io::error::{DungeonError, Result};
use crate::spatial::connections::Side;
use crate::spatial::grid::Grid;

/// Cells linked to `start`, as a row-major bitset over the grid
///
/// An out-of-bounds or unset start yields an empty set.
pub fn reachable_from(grid: &Grid<'_>, start: (usize, usize)) -> BitVec {
    let mut visited = bitvec![0; grid.cols() * grid.rows()];
    if !grid.is_bound(start.0, start.1) {
        return visited;
    }

    let mut queue = VecDeque::from([start]);
    visited.set(grid.index_of(start.0, start.1), true);

    while let Some((col, row)) = queue.pop_front() {
        let Some(tile) = grid.get(col, row) else {
            continue;
        };
        for side in Side::ALL {
            if !tile.connections().has_side(side) {
                continue;
            }
            let Some((n_col, n_row)) = grid.neighbour(col, row, side) else {
                continue;
            };
            let linked = grid
                .get(n_col, n_row)
                .is_some_and(|n| n.connections().has_side(side.opposite()));
            if linked && !visited.replace(grid.index_of(n_col, n_row), true) {
                queue.push_back((n_col, n_row));
            }
        }
    }

    visited
}

/// Check that every connected cell and the exit hang off the entrance
///
/// # Errors
///
/// Returns `UnreachableSection` naming the first offending cell in row-major
/// order, the exit being checked first
pub fn validate(
    grid: &Grid<'_>,
    entrance: (usize, usize),
    exit: Option<(usize, usize)>,
) -> Result<()> {
    let visited = reachable_from(grid, entrance);
    let is_visited =
        |col: usize, row: usize| visited.get(grid.index_of(col, row)).as_deref() == Some(&true);

    if let Some((col, row)) = exit {
        if !is_visited(col, row) {
            return Err(DungeonError::UnreachableSection {
                position: (col, row),
                entrance,
            });
        }
    }

    for (col, row, tile) in grid.cells() {
        let connected = tile.is_some_and(|t| !t.connections().is_empty());
        if connected && !is_visited(col, row) {
            return Err(DungeonError::UnreachableSection {
                position: (col, row),
                entrance,
            });
        }
    }

    Ok(())
}
