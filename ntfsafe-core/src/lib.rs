//! ntfsafe core library — name encoding for length-limited mirror trees.
//!
//! Public API surface:
//! - [`types`] — entry classification, limits, encoded names
//! - [`error`] — [`EncodeError`]
//! - [`metadata`] — the permission/ownership string producer
//! - [`encoder`] — [`NameEncoder`]

pub mod encoder;
pub mod error;
pub mod metadata;
pub mod types;

pub use encoder::NameEncoder;
pub use error::EncodeError;
pub use metadata::{MetadataSource, PosixMetadata};
pub use types::{
    fingerprint, split_extension, EncodedName, EncoderLimits, EntryKind, SourceEntry,
    FINGERPRINT_SEPARATOR, LONG_SUFFIX, MAX_LEN, PERM_DELIMITER,
};
