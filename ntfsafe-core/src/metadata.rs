//! Permission and ownership strings embedded in destination names.
//!
//! The destination filesystem cannot hold POSIX metadata, so the mode and
//! resolved owner/group of every source entry travel in its mirrored name as
//! `<mode>.<owner>.<group>`. The mode is the raw `st_mode` in decimal,
//! file-type bits included; changing this format renames every mirror entry.

use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use uzers::{get_group_by_gid, get_user_by_uid};

use crate::error::{io_err, EncodeError};
use crate::types::PERM_DELIMITER;

/// Produces the metadata string for a source path.
pub trait MetadataSource {
    fn perm_str(&self, path: &Path) -> Result<String, EncodeError>;
}

/// Reads mode, owner and group from the live filesystem and the system
/// user database.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixMetadata;

impl MetadataSource for PosixMetadata {
    fn perm_str(&self, path: &Path) -> Result<String, EncodeError> {
        let meta = stat_following(path)?;
        let owner = get_user_by_uid(meta.uid()).ok_or_else(|| EncodeError::MetadataLookup {
            path: path.to_path_buf(),
            kind: "user",
            id: meta.uid(),
        })?;
        let group = get_group_by_gid(meta.gid()).ok_or_else(|| EncodeError::MetadataLookup {
            path: path.to_path_buf(),
            kind: "group",
            id: meta.gid(),
        })?;
        Ok(format_perm_str(
            meta.mode(),
            &owner.name().to_string_lossy(),
            &group.name().to_string_lossy(),
        ))
    }
}

/// Metadata of `path`, following symbolic links.
///
/// A dangling link has no target to describe, so its own metadata is used.
pub fn stat_following(path: &Path) -> Result<fs::Metadata, EncodeError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            fs::symlink_metadata(path).map_err(|_| io_err(path, err))
        }
        Err(err) => Err(io_err(path, err)),
    }
}

/// `<mode>.<owner>.<group>` with the mode in decimal.
pub fn format_perm_str(mode: u32, owner: &str, group: &str) -> String {
    format!("{mode}{PERM_DELIMITER}{owner}{PERM_DELIMITER}{group}")
}
