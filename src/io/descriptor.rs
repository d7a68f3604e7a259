//! Tile metadata encoded in image file names
//!
//! A tile image is named
//! `name;theme;connections;is_entrance;is_exit;is_permutable;is_flippable.ext`,
//! for example `3WayInter0;fort;T3,T4,R3,R4,B3,B4;false;false;true;false.png`.
//! The connection list may be empty. A permutable tile should be drawn with
//! its connections in the base orientation, since every variant is derived
//! from that image.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::io::configuration::{DESCRIPTOR_FIELD_COUNT, EMPTY_TILE_NAME};
use crate::io::error::{DungeonError, Result};
use crate::spatial::connections::ConnectionMask;
use crate::spatial::tiles::{Tile, TileFlags, TileIdAllocator};

/// Parsed tile metadata, not yet assigned an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDescriptor {
    /// Tile name
    pub name: String,
    /// Theme the tile belongs to
    pub theme: String,
    /// Connectors in the base orientation
    pub connections: ConnectionMask,
    /// Capability flags
    pub flags: TileFlags,
}

impl TileDescriptor {
    /// Parse the descriptor from an image path's file stem
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if the path has no usable file stem or
    /// the stem fails to parse
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| DungeonError::InvalidDescriptor {
                name: path.display().to_string(),
                reason: "file name is not valid UTF-8".to_string(),
            })?;
        stem.parse()
    }

    /// Descriptor of a tile as already oriented
    ///
    /// Permutation flags are cleared so that loading the written image back
    /// does not derive the variants a second time.
    pub fn oriented(tile: &Tile) -> Self {
        Self {
            name: tile.name().to_string(),
            theme: tile.theme().to_string(),
            connections: tile.connections(),
            flags: TileFlags {
                permutable: false,
                flippable: false,
                ..tile.flags()
            },
        }
    }

    /// True for the reserved backfill tile name
    pub fn is_empty_tile(&self) -> bool {
        self.name.eq_ignore_ascii_case(EMPTY_TILE_NAME)
    }

    /// Turn the descriptor into a tile with a fresh id
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the flags break the combination rules
    pub fn into_tile(self, ids: &TileIdAllocator) -> Result<Tile> {
        Tile::new(ids, &self.name, &self.theme, self.connections, self.flags)
    }
}

impl FromStr for TileDescriptor {
    type Err = DungeonError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| DungeonError::InvalidDescriptor {
            name: s.to_string(),
            reason,
        };

        let fields: Vec<&str> = s.split(';').collect();
        let &[name, theme, connections, entrance, exit, permutable, flippable] = fields.as_slice()
        else {
            return Err(invalid(format!(
                "expected {DESCRIPTOR_FIELD_COUNT} ';'-separated fields, found {}",
                fields.len()
            )));
        };

        if name.is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if theme.is_empty() {
            return Err(invalid("theme is empty".to_string()));
        }

        let connections = connections
            .parse::<ConnectionMask>()
            .map_err(|e| invalid(e.to_string()))?;
        let flags = TileFlags {
            entrance: parse_flag("is_entrance", entrance).map_err(&invalid)?,
            exit: parse_flag("is_exit", exit).map_err(&invalid)?,
            permutable: parse_flag("is_permutable", permutable).map_err(&invalid)?,
            flippable: parse_flag("is_flippable", flippable).map_err(&invalid)?,
        };
        flags.validate().map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            theme: theme.to_string(),
            connections,
            flags,
        })
    }
}

impl fmt::Display for TileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{};{};{};{}",
            self.name,
            self.theme,
            self.connections,
            self.flags.entrance,
            self.flags.exit,
            self.flags.permutable,
            self.flags.flippable
        )
    }
}

fn parse_flag(field: &str, value: &str) -> std::result::Result<bool, String> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("{field} must be 'true' or 'false', found '{other}'")),
    }
}
