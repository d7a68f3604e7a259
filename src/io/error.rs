//! Error types and context management for tile loading and map generation

use std::fmt;
use std::path::PathBuf;

use crate::spatial::connections::ConnectionMask;

/// Main error type for all generation and loading operations
#[derive(Debug)]
pub enum DungeonError {
    /// Grid dimensions, pool or another generation parameter is unusable
    ///
    /// Raised before any state is touched, so the engine keeps whatever grid
    /// it held before the call.
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A tile-level operation was handed a tile it cannot work with
    InvalidArgument {
        /// Description of the rejected argument
        reason: String,
    },

    /// No tile in the pool satisfies the connections accumulated for a cell
    ///
    /// The random draw painted the layout into a corner. Regenerating with
    /// fresh randomness usually succeeds.
    NoCandidate {
        /// Connectors a neighbouring tile forces on this cell
        required: ConnectionMask,
        /// Sides the engine chose to leave open
        possible: ConnectionMask,
        /// Cell (col, row) being filled, when known
        position: Option<(usize, usize)>,
    },

    /// A cell that must connect to the entrance is cut off from it
    UnreachableSection {
        /// First unreachable cell (col, row)
        position: (usize, usize),
        /// Entrance cell the search started from
        entrance: (usize, usize),
    },

    /// Internal invariant broken, indicates a bug rather than bad luck
    AssertionViolation {
        /// Short name of the broken invariant
        invariant: &'static str,
        /// What was observed
        detail: String,
    },

    /// A tile descriptor (image file name) could not be parsed
    InvalidDescriptor {
        /// The descriptor text
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Source tiles don't meet loader requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Failed to load a tile image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a composed map image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl DungeonError {
    /// Whether a fresh generation attempt may succeed where this one failed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoCandidate { .. } | Self::UnreachableSection { .. }
        )
    }
}

impl fmt::Display for DungeonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration {
                parameter,
                value,
                reason,
            } => {
                write!(
                    f,
                    "Invalid configuration '{parameter}' = '{value}': {reason}"
                )
            }
            Self::InvalidArgument { reason } => write!(f, "Invalid argument: {reason}"),
            Self::NoCandidate {
                required,
                possible,
                position,
            } => {
                write!(f, "No candidate tile")?;
                if let Some((col, row)) = position {
                    write!(f, " at col:{col} row:{row}")?;
                }
                write!(
                    f,
                    " (required mask {:#010x} [{required}], possible mask {:#010x} [{possible}])",
                    required.bits(),
                    possible.bits()
                )
            }
            Self::UnreachableSection { position, entrance } => {
                write!(
                    f,
                    "Cell col:{} row:{} is not reachable from the entrance at col:{} row:{}",
                    position.0, position.1, entrance.0, entrance.1
                )
            }
            Self::AssertionViolation { invariant, detail } => {
                write!(f, "Invariant '{invariant}' violated: {detail}")
            }
            Self::InvalidDescriptor { name, reason } => {
                write!(f, "Invalid tile descriptor '{name}': {reason}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for DungeonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for generation results
pub type Result<T> = std::result::Result<T, DungeonError>;

/// Attaches the cell being filled to errors raised while filling it
pub trait WithPosition<T> {
    /// Record `(col, row)` on a position-less `NoCandidate` error
    ///
    /// # Errors
    ///
    /// Propagates the original error with the position applied
    fn with_position(self, col: usize, row: usize) -> Result<T>;
}

impl<T, E> WithPosition<T> for std::result::Result<T, E>
where
    E: Into<DungeonError>,
{
    fn with_position(self, col: usize, row: usize) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only selection failures carry a cell
            if let DungeonError::NoCandidate { position, .. } = &mut error {
                if position.is_none() {
                    *position = Some((col, row));
                }
            }
            error
        })
    }
}

impl From<std::io::Error> for DungeonError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid configuration error
pub fn invalid_configuration(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> DungeonError {
    DungeonError::InvalidConfiguration {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an assertion violation error
pub fn assertion_violation(invariant: &'static str, detail: &impl ToString) -> DungeonError {
    DungeonError::AssertionViolation {
        invariant,
        detail: detail.to_string(),
    }
}
