//! Domain types for name encoding.
//!
//! All path fields use `PathBuf`; entry names are `String` because the
//! encoding fingerprints and records their UTF-8 bytes.
//! Lengths are counted in characters, not bytes.

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{io_err, EncodeError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// NTFS file names are limited to 255 characters.
pub const MAX_LEN: usize = 255;

/// Suffix of the sidecar file holding a truncated entry's original name.
pub const LONG_SUFFIX: &str = ".LONG";

/// Separates the (possibly truncated) base from the fingerprint.
pub const FINGERPRINT_SEPARATOR: &str = "--";

/// Separates the fields of the permission string, and the fingerprint from it.
pub const PERM_DELIMITER: char = '.';

// ---------------------------------------------------------------------------
// Entry classification
// ---------------------------------------------------------------------------

/// What a source entry is, judged without following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::File => write!(f, "file"),
            EntryKind::Symlink => write!(f, "symlink"),
            EntryKind::Other => write!(f, "other"),
        }
    }
}

/// A live entry of the source tree, identified by its parent and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub parent: PathBuf,
    pub name: String,
    pub kind: EntryKind,
}

impl SourceEntry {
    /// Classify `parent/name` from its `lstat` metadata.
    pub fn read(parent: &Path, name: &OsStr) -> Result<Self, EncodeError> {
        let path = parent.join(name);
        let Some(name) = name.to_str() else {
            return Err(EncodeError::NonUtf8Name { path });
        };
        let meta = fs::symlink_metadata(&path).map_err(|e| io_err(&path, e))?;
        Ok(Self {
            parent: parent.to_path_buf(),
            name: name.to_owned(),
            kind: EntryKind::from_file_type(meta.file_type()),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.parent.join(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Length budget for generated names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderLimits {
    /// Maximum length of any generated file name, in characters.
    pub max_len: usize,
    /// Suffix appended to the safe name to form the long-name record.
    pub long_suffix: String,
}

impl Default for EncoderLimits {
    fn default() -> Self {
        Self {
            max_len: MAX_LEN,
            long_suffix: LONG_SUFFIX.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoded names
// ---------------------------------------------------------------------------

/// Destination paths produced for one source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedName {
    /// `dest/<base>--<fingerprint>.<perm><ext>`
    pub safe_path: PathBuf,
    /// `dest/<safe name><long suffix>`, present only when the base was truncated.
    pub long_record: Option<PathBuf>,
}

impl EncodedName {
    /// The file name component of [`EncodedName::safe_path`].
    pub fn safe_name(&self) -> &str {
        self.safe_path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
    }

    pub fn is_truncated(&self) -> bool {
        self.long_record.is_some()
    }
}

// ---------------------------------------------------------------------------
// Name helpers
// ---------------------------------------------------------------------------

/// Split `name` at its last extension dot.
///
/// Leading dots do not start an extension, so `.bashrc` has none. The
/// extension keeps its dot: `a.tar.gz` splits into `a.tar` and `.gz`.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => name.split_at(dot),
        _ => (name, ""),
    }
}

/// CRC-32 of the UTF-8 bytes of `name`, as 8 lowercase hex digits.
pub fn fingerprint(name: &str) -> String {
    format!("{:08x}", crc32fast::hash(name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn split_extension_uses_last_dot() {
        assert_eq!(split_extension("a.txt"), ("a", ".txt"));
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
        assert_eq!(split_extension("noext"), ("noext", ""));
    }

    #[test]
    fn split_extension_ignores_leading_dots() {
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("..."), ("...", ""));
        assert_eq!(split_extension("..hidden.md"), ("..hidden", ".md"));
    }

    #[test]
    fn split_extension_keeps_trailing_dot() {
        assert_eq!(split_extension("a."), ("a", "."));
    }

    #[test]
    fn fingerprint_is_crc32_hex() {
        assert_eq!(fingerprint("123456789"), "cbf43926");
        assert_eq!(fingerprint("hello"), "3610a686");
        assert_eq!(fingerprint(""), "00000000");
    }

    #[test]
    fn source_entry_classifies_without_following_links() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("dir")).unwrap();
        fs::write(tmp.path().join("file"), "x").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("dir"), tmp.path().join("link")).unwrap();

        let kind = |name: &str| SourceEntry::read(tmp.path(), OsStr::new(name)).unwrap().kind;
        assert_eq!(kind("dir"), EntryKind::Directory);
        assert_eq!(kind("file"), EntryKind::File);
        assert_eq!(kind("link"), EntryKind::Symlink);
    }

    #[test]
    fn source_entry_path_joins_parent_and_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "x").unwrap();
        let entry = SourceEntry::read(tmp.path(), OsStr::new("a.txt")).unwrap();
        assert_eq!(entry.path(), tmp.path().join("a.txt"));
        assert_eq!(entry.name, "a.txt");
    }

    #[test]
    fn encoded_name_reports_truncation() {
        let plain = EncodedName {
            safe_path: PathBuf::from("/dest/a--00000000.1.u.g.txt"),
            long_record: None,
        };
        assert_eq!(plain.safe_name(), "a--00000000.1.u.g.txt");
        assert!(!plain.is_truncated());
    }
}
