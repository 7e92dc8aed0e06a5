//! Error types for fragment cache operations.

use std::path::PathBuf;

/// Errors that can occur during fragment cache operations.
///
/// The cache never catches and logs: every error propagates synchronously
/// to the caller at the point of the failing call. Staleness correctness
/// depends on accurate modification times, so filesystem failures are
/// surfaced rather than treated as cache misses.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The dependency-tree file was absent at construction.
    ///
    /// Fatal: no default tree is silently created in its place.
    #[error("view dependency tree file does not exist: {path}")]
    MissingTreeFile {
        /// The configured tree file path.
        path: PathBuf,
    },

    /// `start()` was called on a session that is already capturing.
    ///
    /// A programming error in the caller; never retried.
    #[error("cache fragment capture already started")]
    SessionAlreadyStarted,

    /// The filesystem could not report a modification time.
    #[error("modification time unavailable for {path}: {source}")]
    ModificationTime {
        /// The path that could not be stat'ed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O error occurred while reading or writing a cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The dependency tree could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The external cache store reported a failure.
    #[error("store error: {reason}")]
    Store {
        /// Description of the store failure.
        reason: String,
    },

    /// A view or partial name could not be resolved to a path.
    #[error("view not found: {name}")]
    ViewNotFound {
        /// The unresolvable view or partial name.
        name: String,
    },
}
