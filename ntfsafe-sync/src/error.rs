//! Error types for ntfsafe-sync.

use std::path::PathBuf;

use thiserror::Error;

use ntfsafe_core::EncodeError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A destination name could not be produced.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sync root does not exist or is not a directory.
    #[error("'{path}' is not a directory or does not exist.")]
    NotADirectory { path: PathBuf },

    /// Source and destination are the same tree or nested in each other.
    #[error("source {source_dir} and destination {dest_dir} overlap")]
    OverlappingTrees {
        source_dir: PathBuf,
        dest_dir: PathBuf,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
