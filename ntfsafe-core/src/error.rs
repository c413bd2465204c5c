//! Error types for ntfsafe-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while encoding a destination name.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The owning user or group id has no entry in the system database.
    #[error("cannot resolve {kind} id {id} for {path}")]
    MetadataLookup {
        path: PathBuf,
        kind: &'static str,
        id: u32,
    },

    /// The fingerprint/metadata tail leaves no room for the base name.
    #[error("name '{name}' cannot fit in {max_len} characters: tail alone needs {tail_len}")]
    NameTooLong {
        name: String,
        tail_len: usize,
        max_len: usize,
    },

    /// Entry names must be UTF-8 to be fingerprinted and recorded.
    #[error("entry name is not valid UTF-8: {path}")]
    NonUtf8Name { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`EncodeError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EncodeError {
    EncodeError::Io {
        path: path.into(),
        source,
    }
}
