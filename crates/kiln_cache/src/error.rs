//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Only identity lookups of a primary file surface errors; a dependency that
/// can no longer be read simply invalidates the entries that recorded it.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// File metadata could not be read.
    #[error("cannot read metadata of {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
