//! Tile directory scanning and pool construction
//!
//! Every image in the tile directory is parsed for its descriptor, loaded, and
//! added to the pool together with its rotated and mirrored variants. The
//! variant images are derived from the base image so that rendering matches
//! the variant's connectors, and can be written out to a "loaded" directory
//! for inspection or reuse.

use image::{RgbaImage, imageops};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::algorithm::permutation::TilePermuter;
use crate::algorithm::pool::{TilePool, TilePoolBuilder};
use crate::io::configuration::{OUTPUT_EXTENSION, TILE_IMAGE_EXTENSIONS};
use crate::io::descriptor::TileDescriptor;
use crate::io::error::{DungeonError, Result};
use crate::spatial::tiles::{Orientation, Rotation, TileId, TileIdAllocator};

/// Tile pool plus the image for every tile in it
#[derive(Debug, Clone)]
pub struct TileLibrary {
    pool: TilePool,
    images: HashMap<TileId, RgbaImage>,
    tile_size: u32,
}

impl TileLibrary {
    /// Pair a pool with its images
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` if a pool tile has no image, or images
    /// are not all squares of one size
    pub fn new(pool: TilePool, images: HashMap<TileId, RgbaImage>) -> Result<Self> {
        let mut tile_size = None;
        for tile in pool.tiles().chain(pool.empty_tile()) {
            let image = images
                .get(&tile.id())
                .ok_or_else(|| DungeonError::InvalidSourceData {
                    reason: format!("tile '{}' (id {}) has no image", tile.name(), tile.id()),
                })?;
            let size = check_square(image, tile.name())?;
            match tile_size {
                None => tile_size = Some(size),
                Some(expected) if expected != size => {
                    return Err(DungeonError::InvalidSourceData {
                        reason: format!(
                            "tile '{}' is {size}px but other tiles are {expected}px",
                            tile.name()
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            pool,
            images,
            tile_size: tile_size.unwrap_or(0),
        })
    }

    /// The tile pool
    pub const fn pool(&self) -> &TilePool {
        &self.pool
    }

    /// Image drawn for a tile
    pub fn image(&self, id: TileId) -> Option<&RgbaImage> {
        self.images.get(&id)
    }

    /// Edge length in pixels shared by all tile images
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }
}

/// Load every tile image in `dir` and build the pool
///
/// Files are processed in name order so ids are stable between runs.
///
/// # Errors
///
/// - `FileSystem` if the directory can't be read
/// - `InvalidSourceData` if it holds no tile images or sizes disagree
/// - `InvalidDescriptor` / `ImageLoad` for individual bad files
pub fn load_tiles(dir: &Path, ids: &TileIdAllocator) -> Result<TileLibrary> {
    let files = collect_tile_files(dir)?;
    if files.is_empty() {
        return Err(DungeonError::InvalidSourceData {
            reason: format!("no tile images found in '{}'", dir.display()),
        });
    }

    let permuter = TilePermuter::new(ids);
    let mut builder = TilePoolBuilder::default();
    let mut images = HashMap::new();

    for path in &files {
        let descriptor = TileDescriptor::from_path(path)?;
        let image = image::open(path)
            .map_err(|e| DungeonError::ImageLoad {
                path: path.clone(),
                source: e,
            })?
            .to_rgba8();

        if descriptor.is_empty_tile() {
            if builder.has_empty_tile() {
                log::warn!("Ignoring extra empty tile '{}'", path.display());
                continue;
            }
            let tile = descriptor.into_tile(ids)?;
            images.insert(tile.id(), image);
            builder.empty_tile(tile)?;
            continue;
        }

        let tile = descriptor.into_tile(ids)?;
        if tile.is_permutable() {
            for variant in permuter.permute(&tile)? {
                images.insert(variant.id(), orient_image(&image, variant.orientation()));
                builder.insert(variant)?;
            }
        }
        log::debug!("Loaded tile {tile}");
        images.insert(tile.id(), image);
        builder.insert(tile)?;
    }

    let pool = builder.build();
    if pool.empty_tile().is_none() {
        log::warn!("No empty tile found in '{}'", dir.display());
    }
    log::info!(
        "Loaded {} tiles ({} files, {} entrances, {} exits)",
        pool.len(),
        files.len(),
        pool.entrance_count(),
        pool.exit_count()
    );
    TileLibrary::new(pool, images)
}

/// Write every tile image, variants included, into `dir`
///
/// Each file is named after the tile's oriented descriptor, so the directory
/// can be loaded again as a tile set. Returns the number of images written.
///
/// # Errors
///
/// - `FileSystem` if `dir` cannot be created
/// - `ImageExport` if an image cannot be saved
pub fn export_loaded(library: &TileLibrary, dir: &Path) -> Result<usize> {
    create_dir(dir)?;

    let pool = library.pool();
    let mut written = HashSet::new();
    for tile in pool.tiles().chain(pool.empty_tile()) {
        let Some(image) = library.image(tile.id()) else {
            continue;
        };
        let stem = TileDescriptor::oriented(tile).to_string();
        if !written.insert(stem.clone()) {
            log::warn!("Skipping tile {} with a duplicate descriptor '{stem}'", tile.id());
            continue;
        }

        let path = dir.join(format!("{stem}.{OUTPUT_EXTENSION}"));
        image.save(&path).map_err(|e| DungeonError::ImageExport {
            path: path.clone(),
            source: e,
        })?;
        log::trace!("Wrote loaded tile '{}'", path.display());
    }

    log::info!("Wrote {} loaded tiles to '{}'", written.len(), dir.display());
    Ok(written.len())
}

/// Check the tile directory and create the directories a run writes to
///
/// A missing tile directory is created so the user has somewhere to put
/// tiles, but the run still fails since there is nothing to load.
///
/// # Errors
///
/// - `InvalidSourceData` if `tiles` was missing or holds no tile images
/// - `FileSystem` if a directory cannot be read or created
pub fn prepare_directories(tiles: &Path, writable: &[&Path]) -> Result<()> {
    if !tiles.is_dir() {
        create_dir(tiles)?;
        return Err(DungeonError::InvalidSourceData {
            reason: format!(
                "tile directory '{}' was missing and has been created, add tile images to it",
                tiles.display()
            ),
        });
    }
    if collect_tile_files(tiles)?.is_empty() {
        return Err(DungeonError::InvalidSourceData {
            reason: format!("tile directory '{}' has no tile images", tiles.display()),
        });
    }

    for dir in writable {
        create_dir(dir)?;
    }
    Ok(())
}

/// Apply a variant's flip and clockwise rotation to its base image
pub fn orient_image(base: &RgbaImage, orientation: Orientation) -> RgbaImage {
    let flipped;
    let source = if orientation.flipped {
        flipped = imageops::flip_horizontal(base);
        &flipped
    } else {
        base
    };

    match orientation.rotation {
        Rotation::None => source.clone(),
        Rotation::Quarter => imageops::rotate90(source),
        Rotation::Half => imageops::rotate180(source),
        Rotation::ThreeQuarter => imageops::rotate270(source),
    }
}

fn collect_tile_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| DungeonError::FileSystem {
        path: dir.to_path_buf(),
        operation: "read tile directory",
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                TILE_IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if path.is_file() && is_image {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| DungeonError::FileSystem {
        path: dir.to_path_buf(),
        operation: "create directory",
        source: e,
    })
}

fn check_square(image: &RgbaImage, name: &str) -> Result<u32> {
    let (width, height) = image.dimensions();
    if width != height || width == 0 {
        return Err(DungeonError::InvalidSourceData {
            reason: format!("tile '{name}' must be a non-empty square, found {width}x{height}"),
        });
    }
    Ok(width)
}
