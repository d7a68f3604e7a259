//! Map rendering from tile images

use image::{RgbaImage, imageops};
use std::path::Path;

use crate::io::error::{DungeonError, Result};
use crate::io::loader::TileLibrary;
use crate::spatial::grid::Grid;

/// Draw every bound cell of `grid` into one image
///
/// The result is `cols * tile_size` wide and `rows * tile_size` tall. Unset
/// cells stay transparent.
///
/// # Errors
///
/// Returns `InvalidSourceData` if a bound tile has no image in `library`
pub fn compose_grid(grid: &Grid<'_>, library: &TileLibrary) -> Result<RgbaImage> {
    let size = library.tile_size();
    let mut canvas = RgbaImage::new(size * grid.cols() as u32, size * grid.rows() as u32);

    for (col, row, tile) in grid.cells() {
        let Some(tile) = tile else {
            continue;
        };
        let image = library
            .image(tile.id())
            .ok_or_else(|| DungeonError::InvalidSourceData {
                reason: format!("no image for tile '{}' (id {})", tile.name(), tile.id()),
            })?;
        imageops::replace(
            &mut canvas,
            image,
            i64::from(size) * col as i64,
            i64::from(size) * row as i64,
        );
    }

    Ok(canvas)
}

/// Compose `grid` and save it, creating parent directories as needed
///
/// The format follows the extension of `output_path`.
///
/// # Errors
///
/// Returns an error if:
/// - A bound tile has no image
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_grid(grid: &Grid<'_>, library: &TileLibrary, output_path: &Path) -> Result<()> {
    let canvas = compose_grid(grid, library)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DungeonError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    canvas
        .save(output_path)
        .map_err(|e| DungeonError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    log::debug!("Saved map to '{}'", output_path.display());
    Ok(())
}
