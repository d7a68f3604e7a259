//! Map grid storage and connector diagnostics
//!
//! The grid is a `rows x cols` matrix of optional tile references. Public
//! coordinates are `(col, row)` with the origin at the top-left corner; the
//! backing `ndarray` is indexed `[row, col]`.

use ndarray::Array2;
use std::fmt;

use crate::io::error::{DungeonError, Result};
use crate::spatial::connections::{ConnectionMask, Side};
use crate::spatial::tiles::Tile;

/// Text used for an unbound cell in the connection layout
const UNSET_CELL: &str = "null";

/// Matrix of tiles bound to map cells
#[derive(Debug, Clone)]
pub struct Grid<'p> {
    cells: Array2<Option<&'p Tile>>,
}

impl<'p> Grid<'p> {
    /// Grid of `cols x rows` unset cells
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cells: Array2::from_elem((rows, cols), None),
        }
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// Tile bound at `(col, row)`, `None` when unset or out of bounds
    pub fn get(&self, col: usize, row: usize) -> Option<&'p Tile> {
        self.cells.get([row, col]).copied().flatten()
    }

    /// Bind `tile` at `(col, row)`, returning false if out of bounds
    pub fn set(&mut self, col: usize, row: usize, tile: &'p Tile) -> bool {
        self.cells.get_mut([row, col]).is_some_and(|cell| {
            *cell = Some(tile);
            true
        })
    }

    /// True if `(col, row)` lies inside the grid
    pub fn contains(&self, col: usize, row: usize) -> bool {
        col < self.cols() && row < self.rows()
    }

    /// True if `(col, row)` is inside the grid and bound
    pub fn is_bound(&self, col: usize, row: usize) -> bool {
        self.get(col, row).is_some()
    }

    /// Coordinates of the neighbour on `side`, if it lies inside the grid
    pub fn neighbour(&self, col: usize, row: usize, side: Side) -> Option<(usize, usize)> {
        let (dcol, drow) = side.offset();
        let n_col = col.checked_add_signed(dcol)?;
        let n_row = row.checked_add_signed(drow)?;
        self.contains(n_col, n_row).then_some((n_col, n_row))
    }

    /// Flat index of a cell, row-major
    pub fn index_of(&self, col: usize, row: usize) -> usize {
        row * self.cols() + col
    }

    /// True once every cell is bound
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// All cells as `(col, row, tile)` in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Option<&'p Tile>)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), tile)| (col, row, *tile))
    }

    /// Coordinates of every unset cell in row-major order
    pub fn unset_cells(&self) -> Vec<(usize, usize)> {
        self.cells()
            .filter(|(_, _, tile)| tile.is_none())
            .map(|(col, row, _)| (col, row))
            .collect()
    }

    /// Connector mask of every cell, unset cells as `None`
    pub fn masks(&self) -> Array2<Option<ConnectionMask>> {
        self.cells.map(|cell| cell.map(Tile::connections))
    }

    /// Adjacent bound pairs whose touching sides disagree
    ///
    /// Each entry is the cell and the side on which it mismatches its right
    /// or lower neighbour. A consistent map returns an empty list.
    pub fn adjacency_mismatches(&self) -> Vec<(usize, usize, Side)> {
        let mut mismatches = Vec::new();
        for (col, row, tile) in self.cells() {
            let Some(tile) = tile else {
                continue;
            };
            for side in [Side::Right, Side::Bottom] {
                let Some((n_col, n_row)) = self.neighbour(col, row, side) else {
                    continue;
                };
                let Some(neighbour) = self.get(n_col, n_row) else {
                    continue;
                };
                if tile.connections().side(side)
                    != neighbour.connections().mirrored_side(side.opposite())
                {
                    mismatches.push((col, row, side));
                }
            }
        }
        mismatches
    }

    /// Human-readable connector dump, one line per row
    ///
    /// Each cell is written as its bracketed token list, e.g.
    /// `Row[0]:[R0,R1][L6,L7][null]`.
    pub fn connection_layout(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Grid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            write!(f, "Row[{row}]:")?;
            for col in 0..self.cols() {
                match self.get(col, row) {
                    Some(tile) => write!(f, "[{}]", tile.connections())?,
                    None => write!(f, "[{UNSET_CELL}]")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parse the output of [`Grid::connection_layout`] back into masks
///
/// Returns a `rows x cols` matrix; lines that don't start with `Row[` are
/// ignored so a full engine dump can be fed in directly.
///
/// # Errors
///
/// Returns `InvalidArgument` on malformed rows, unknown connector tokens or
/// rows of differing length
pub fn parse_connection_layout(text: &str) -> Result<Array2<Option<ConnectionMask>>> {
    let mut rows: Vec<Vec<Option<ConnectionMask>>> = Vec::new();

    for line in text.lines().map(str::trim) {
        if !line.starts_with("Row[") {
            continue;
        }
        let Some((_, cells)) = line.split_once(':') else {
            return Err(malformed(line, "missing ':' after row label"));
        };

        let mut parsed = Vec::new();
        let mut rest = cells;
        while !rest.is_empty() {
            let Some(body) = rest.strip_prefix('[') else {
                return Err(malformed(line, "expected '['"));
            };
            let Some((cell, tail)) = body.split_once(']') else {
                return Err(malformed(line, "unterminated cell"));
            };
            parsed.push(if cell == UNSET_CELL {
                None
            } else {
                Some(cell.parse::<ConnectionMask>()?)
            });
            rest = tail;
        }

        if rows.first().is_some_and(|first| first.len() != parsed.len()) {
            return Err(malformed(line, "row length differs from the first row"));
        }
        rows.push(parsed);
    }

    let cols = rows.first().map_or(0, Vec::len);
    let height = rows.len();
    Array2::from_shape_vec((height, cols), rows.into_iter().flatten().collect())
        .map_err(|e| malformed(text, &e))
}

fn malformed(line: &str, reason: &(impl fmt::Display + ?Sized)) -> DungeonError {
    DungeonError::InvalidArgument {
        reason: format!("malformed connection layout line '{line}': {reason}"),
    }
}
