//! Tile records and id allocation
//!
//! Tiles are created once, either from a loaded descriptor or by permuting a
//! base tile, and are never mutated afterwards. Generation engines only ever
//! hold shared references to them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::io::error::{DungeonError, Result};
use crate::spatial::connections::ConnectionMask;

/// Unique tile identifier, never reused within one allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of tile ids
///
/// Owned by whoever builds the pool and passed explicitly to every step that
/// creates tiles. Allocation is atomic so a shared reference suffices.
#[derive(Debug, Default)]
pub struct TileIdAllocator {
    next: AtomicU64,
}

impl TileIdAllocator {
    /// Allocator handing out ids from zero
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Allocator handing out ids from `first`
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Take the next unused id
    pub fn allocate(&self) -> TileId {
        TileId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Capability flags of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
// Mirrors the four independent descriptor flags
#[allow(clippy::struct_excessive_bools)]
pub struct TileFlags {
    /// Rotated variants may be derived from this tile
    pub permutable: bool,
    /// Mirrored variants may be derived as well (requires `permutable`)
    pub flippable: bool,
    /// May be placed as the map entrance
    pub entrance: bool,
    /// May be placed as the map exit
    pub exit: bool,
}

impl TileFlags {
    /// Check the flag combination rules
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the tile is both entrance and exit, or
    /// flippable without being permutable
    pub fn validate(self) -> Result<()> {
        if self.entrance && self.exit {
            return Err(DungeonError::InvalidArgument {
                reason: "a tile cannot be both an entrance and an exit".to_string(),
            });
        }
        if self.flippable && !self.permutable {
            return Err(DungeonError::InvalidArgument {
                reason: "a tile cannot be flippable without being permutable".to_string(),
            });
        }
        Ok(())
    }
}

/// Clockwise rotation applied to a derived tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// Unrotated
    #[default]
    None,
    /// 90 degrees clockwise
    Quarter,
    /// 180 degrees
    Half,
    /// 270 degrees clockwise
    ThreeQuarter,
}

impl Rotation {
    /// Rotations 90, 180 and 270 in order
    pub const TURNS: [Self; 3] = [Self::Quarter, Self::Half, Self::ThreeQuarter];

    /// Number of clockwise quarter turns
    pub const fn quarter_turns(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Quarter => 1,
            Self::Half => 2,
            Self::ThreeQuarter => 3,
        }
    }

    /// Rotation in degrees
    pub const fn degrees(self) -> u32 {
        self.quarter_turns() * 90
    }
}

/// How a derived tile was produced from its base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    /// Tile this one was derived from, `None` for loaded tiles
    pub base: Option<TileId>,
    /// Clockwise rotation applied after any flip
    pub rotation: Rotation,
    /// Whether the base was mirrored left-to-right first
    pub flipped: bool,
}

/// One placeable tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    name: String,
    theme: String,
    connections: ConnectionMask,
    flags: TileFlags,
    orientation: Orientation,
}

impl Tile {
    /// Create a base tile with a freshly allocated id
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the name or theme is empty or the flags
    /// break the combination rules
    pub fn new(
        ids: &TileIdAllocator,
        name: &str,
        theme: &str,
        connections: ConnectionMask,
        flags: TileFlags,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(DungeonError::InvalidArgument {
                reason: "tile name is empty".to_string(),
            });
        }
        if theme.is_empty() {
            return Err(DungeonError::InvalidArgument {
                reason: format!("tile '{name}' has an empty theme"),
            });
        }
        flags.validate()?;

        Ok(Self {
            id: ids.allocate(),
            name: name.to_string(),
            theme: theme.to_string(),
            connections,
            flags,
            orientation: Orientation::default(),
        })
    }

    /// Derived variant of `base`, never itself permutable
    pub(crate) fn derived(
        base: &Self,
        id: TileId,
        connections: ConnectionMask,
        rotation: Rotation,
        flipped: bool,
    ) -> Self {
        let mut name = base.name.clone();
        if flipped {
            name.push_str("_f");
        }
        if rotation != Rotation::None {
            name.push_str(&format!("_r{}", rotation.degrees()));
        }

        Self {
            id,
            name,
            theme: base.theme.clone(),
            connections,
            flags: TileFlags {
                permutable: false,
                flippable: false,
                entrance: base.flags.entrance,
                exit: base.flags.exit,
            },
            orientation: Orientation {
                base: Some(base.id),
                rotation,
                flipped,
            },
        }
    }

    /// Unique id
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Descriptive name, suffixed for derived tiles
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Theme the tile belongs to
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Connector mask
    pub const fn connections(&self) -> ConnectionMask {
        self.connections
    }

    /// Capability flags
    pub const fn flags(&self) -> TileFlags {
        self.flags
    }

    /// Derivation record
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Rotated variants may be derived from this tile
    pub const fn is_permutable(&self) -> bool {
        self.flags.permutable
    }

    /// Mirrored variants may be derived from this tile
    pub const fn is_flippable(&self) -> bool {
        self.flags.flippable
    }

    /// May be placed as the entrance
    pub const fn is_entrance(&self) -> bool {
        self.flags.entrance
    }

    /// May be placed as the exit
    pub const fn is_exit(&self) -> bool {
        self.flags.exit
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID:{},Name:{},Theme:{},Connections:[{}]",
            self.id, self.name, self.theme, self.connections
        )?;
        if self.flags.entrance {
            write!(f, ",entrance")?;
        }
        if self.flags.exit {
            write!(f, ",exit")?;
        }
        if self.flags.permutable {
            write!(f, ",permutable")?;
        }
        if self.flags.flippable {
            write!(f, ",flippable")?;
        }
        Ok(())
    }
}
