//! Submodule defining the errors used across the crate.

use std::io;
use std::path::PathBuf;

use crate::rewrite::Target;

/// Errors that can occur while compacting a dump.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The dump could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The rewritten dump could not be written back.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// File that was being replaced.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Choices reference questions that are not declared, sorted ascending.
    #[error("Found invalid question references: {0:?}")]
    InvalidReferences(Vec<u64>),
    /// A scanned ID has no entry in its gap mapping.
    #[error("No mapping for {target} ID {id}")]
    Unmapped {
        /// Which column the ID came from.
        target: Target,
        /// The ID without a mapping.
        id: u64,
    },
    /// Two scanned ID literals share bytes, so they cannot both be rewritten.
    #[error("Overlapping ID literals at byte {at}")]
    OverlappingLiterals {
        /// Start of the second literal.
        at: usize,
    },
    /// Questions and choices were configured with the same table.
    #[error("Questions and choices cannot share table '{0}'")]
    SharedTable(String),
    /// The choice foreign key was configured as the choice `id` column.
    #[error("Foreign key column '{0}' cannot be the choice id column")]
    ForeignKeyIsId(String),
    /// A table name produced an invalid extraction pattern.
    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}
