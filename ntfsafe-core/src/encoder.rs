//! Source name → destination name encoding.
//!
//! ## Layout
//!
//! ```text
//! <base>--<crc32 of full name>.<mode>.<owner>.<group><ext>
//! ```
//!
//! `base` is cut, character-wise, only when the whole name would exceed the
//! length limit. A cut base also leaves room for the long-name suffix, and
//! the entry then gets a sidecar `<safe name>.LONG` holding the original name.
//! The fingerprint is taken over the full original name, so entries sharing a
//! truncated prefix still receive distinct safe names.

use std::path::Path;

use crate::error::EncodeError;
use crate::metadata::{MetadataSource, PosixMetadata};
use crate::types::{
    fingerprint, split_extension, EncodedName, EncoderLimits, FINGERPRINT_SEPARATOR,
    PERM_DELIMITER,
};

/// Maps `(dest dir, source dir, name)` to a length-bounded destination name.
#[derive(Debug, Clone, Default)]
pub struct NameEncoder<M = PosixMetadata> {
    metadata: M,
    limits: EncoderLimits,
}

impl NameEncoder<PosixMetadata> {
    /// Encoder reading ownership from the system user database.
    pub fn new(limits: EncoderLimits) -> Self {
        Self::with_metadata(PosixMetadata, limits)
    }
}

impl<M: MetadataSource> NameEncoder<M> {
    pub fn with_metadata(metadata: M, limits: EncoderLimits) -> Self {
        Self { metadata, limits }
    }

    /// Encode `name`, an entry of `source_dir`, into a path under `dest_dir`.
    ///
    /// Reads the live metadata of `source_dir/name`; nothing is written.
    pub fn encode(
        &self,
        dest_dir: &Path,
        source_dir: &Path,
        name: &str,
    ) -> Result<EncodedName, EncodeError> {
        let (base, ext) = split_extension(name);
        let perm = self.metadata.perm_str(&source_dir.join(name))?;
        let tail = format!(
            "{FINGERPRINT_SEPARATOR}{}{PERM_DELIMITER}{perm}{ext}",
            fingerprint(name)
        );

        let max_len = self.limits.max_len;
        let tail_len = tail.chars().count();
        let too_long = |tail_len| EncodeError::NameTooLong {
            name: name.to_owned(),
            tail_len,
            max_len,
        };

        let len_limit = max_len.checked_sub(tail_len).ok_or_else(|| too_long(tail_len))?;
        if base.chars().count() <= len_limit {
            return Ok(EncodedName {
                safe_path: dest_dir.join(format!("{base}{tail}")),
                long_record: None,
            });
        }

        let suffix = self.limits.long_suffix.as_str();
        let suffix_len = suffix.chars().count();
        let max_base = len_limit
            .checked_sub(suffix_len)
            .ok_or_else(|| too_long(tail_len + suffix_len))?;
        let truncated: String = base.chars().take(max_base).collect();
        let safe_name = format!("{truncated}{tail}");

        Ok(EncodedName {
            safe_path: dest_dir.join(&safe_name),
            long_record: Some(dest_dir.join(format!("{safe_name}{suffix}"))),
        })
    }
}
