//! Recursive mirror synchronisation.
//!
//! ## `sync` — two passes per directory
//!
//! 1. Create pass: list the source directory; for every entry encode its
//!    safe name, record it (and its long-name record) in the level's
//!    [`CreatedSet`], create the mirror entry if nothing exists at that path,
//!    then recurse when the mirror entry is a real directory.
//! 2. Prune pass: list the destination directory again and delete every
//!    entry not in the level's set, directories with all their contents.
//!
//! Each level owns its set, so a subtree's survivors never protect entries
//! elsewhere. Every existence and directory check uses `lstat`; links in the
//! mirror are never followed.
//!
//! Nothing guards against concurrent changes to either tree: an entry added
//! to the destination after the prune pass lists it survives until the next
//! run, and one appearing in the source after the create pass is pruned.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use ntfsafe_core::{
    EncodedName, EncoderLimits, EntryKind, MetadataSource, NameEncoder, PosixMetadata,
    SourceEntry,
};

use crate::error::{io_err, SyncError};
use crate::report::{Reporter, SyncEvent, SyncSummary};

/// Destination paths produced by one directory level's create pass.
pub type CreatedSet = BTreeSet<PathBuf>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Settings fixed for the lifetime of a synchronizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub limits: EncoderLimits,
    /// Mirror symlinks to directories as directories and descend into them.
    /// Links leading back to a directory being synced, or into or above the
    /// destination, stay links.
    pub follow_dir_links: bool,
}

// ---------------------------------------------------------------------------
// TreeSynchronizer
// ---------------------------------------------------------------------------

/// Keeps a destination tree of links and directories in step with a source.
pub struct TreeSynchronizer<'r, M = PosixMetadata> {
    encoder: NameEncoder<M>,
    follow_dir_links: bool,
    reporter: &'r dyn Reporter,
    summary: SyncSummary,
    /// Canonical source directories currently being synced, outermost first.
    ancestors: Vec<PathBuf>,
    /// Canonical destination of the outermost `sync` call, in follow mode.
    dest_root: Option<PathBuf>,
}

impl<'r> TreeSynchronizer<'r, PosixMetadata> {
    pub fn new(options: &SyncOptions, reporter: &'r dyn Reporter) -> Self {
        Self::from_encoder(NameEncoder::new(options.limits.clone()), options, reporter)
    }
}

impl<'r, M: MetadataSource> TreeSynchronizer<'r, M> {
    pub fn with_metadata(metadata: M, options: &SyncOptions, reporter: &'r dyn Reporter) -> Self {
        let encoder = NameEncoder::with_metadata(metadata, options.limits.clone());
        Self::from_encoder(encoder, options, reporter)
    }

    fn from_encoder(
        encoder: NameEncoder<M>,
        options: &SyncOptions,
        reporter: &'r dyn Reporter,
    ) -> Self {
        Self {
            encoder,
            follow_dir_links: options.follow_dir_links,
            reporter,
            summary: SyncSummary::default(),
            ancestors: Vec::new(),
            dest_root: None,
        }
    }

    /// Counts accumulated over every `sync` call so far.
    pub fn summary(&self) -> &SyncSummary {
        &self.summary
    }

    pub fn into_summary(self) -> SyncSummary {
        self.summary
    }

    /// Synchronise `dest_dir` with `source_dir`, recursively.
    ///
    /// Both must be existing directories. Returns the paths this level
    /// created or confirmed; the first failure aborts the run.
    pub fn sync(&mut self, source_dir: &Path, dest_dir: &Path) -> Result<CreatedSet, SyncError> {
        let outermost = self.ancestors.is_empty();
        if self.follow_dir_links {
            let canonical = fs::canonicalize(source_dir).map_err(|e| io_err(source_dir, e))?;
            if outermost {
                let root = fs::canonicalize(dest_dir).map_err(|e| io_err(dest_dir, e))?;
                self.dest_root = Some(root);
            }
            self.ancestors.push(canonical);
        }

        let result = self
            .create_pass(source_dir, dest_dir)
            .and_then(|created| self.prune_pass(dest_dir, &created).map(|()| created));

        if self.follow_dir_links {
            self.ancestors.pop();
            if outermost {
                self.dest_root = None;
            }
        }
        result
    }

    fn create_pass(&mut self, source_dir: &Path, dest_dir: &Path) -> Result<CreatedSet, SyncError> {
        let mut created = CreatedSet::new();

        for name in list_names(source_dir)? {
            let entry = SourceEntry::read(source_dir, &name)?;
            let encoded = self.encoder.encode(dest_dir, source_dir, &entry.name)?;
            self.summary.entries_seen += 1;

            created.insert(encoded.safe_path.clone());
            if let Some(long) = &encoded.long_record {
                created.insert(long.clone());
            }

            let as_dir = self.mirrors_as_dir(&entry)?;
            self.ensure_entry(&entry, as_dir, &encoded)?;

            if as_dir && is_real_dir(&encoded.safe_path)? {
                self.sync(&entry.path(), &encoded.safe_path)?;
            }
        }

        tracing::debug!(
            "create pass {} -> {}: {} paths",
            source_dir.display(),
            dest_dir.display(),
            created.len()
        );
        Ok(created)
    }

    fn prune_pass(&mut self, dest_dir: &Path, created: &CreatedSet) -> Result<(), SyncError> {
        for name in list_names(dest_dir)? {
            let path = dest_dir.join(&name);
            if created.contains(&path) {
                continue;
            }

            let meta = fs::symlink_metadata(&path).map_err(|e| io_err(&path, e))?;
            if meta.is_dir() {
                fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
                self.emit(SyncEvent::RemoveDir { path });
            } else {
                fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
                self.emit(SyncEvent::RemoveFile { path });
            }
        }
        Ok(())
    }

    /// Whether `entry` is mirrored as a directory rather than a link.
    fn mirrors_as_dir(&self, entry: &SourceEntry) -> Result<bool, SyncError> {
        match entry.kind {
            EntryKind::Directory => Ok(true),
            EntryKind::Symlink if self.follow_dir_links => {
                let path = entry.path();
                let Ok(target) = fs::canonicalize(&path) else {
                    tracing::debug!("unresolvable link mirrored as link: {}", path.display());
                    return Ok(false);
                };
                if !target.is_dir() {
                    return Ok(false);
                }
                if self.ancestors.contains(&target) {
                    tracing::warn!(
                        "{} cycle at {} -> {}; mirrored as link",
                        entry.kind,
                        path.display(),
                        target.display()
                    );
                    return Ok(false);
                }
                // Never descend into the mirror itself.
                if let Some(root) = &self.dest_root {
                    if target.starts_with(root) || root.starts_with(&target) {
                        tracing::warn!(
                            "{} {} -> {} reaches the destination; mirrored as link",
                            entry.kind,
                            path.display(),
                            target.display()
                        );
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn ensure_entry(
        &mut self,
        entry: &SourceEntry,
        as_dir: bool,
        encoded: &EncodedName,
    ) -> Result<(), SyncError> {
        let safe = &encoded.safe_path;

        if lexists(safe)? {
            // Heal a sidecar removed behind our back.
            if let Some(long) = &encoded.long_record {
                if !lexists(long)? {
                    self.write_long_record(long, &entry.name)?;
                }
            }
            return Ok(());
        }

        if as_dir {
            fs::create_dir(safe).map_err(|e| io_err(safe, e))?;
            self.emit(SyncEvent::CreateDir { path: safe.clone() });
        } else {
            let target = entry.path();
            symlink(&target, safe).map_err(|e| io_err(safe, e))?;
            self.emit(SyncEvent::CreateLink {
                path: safe.clone(),
                target,
            });
        }

        if let Some(long) = &encoded.long_record {
            self.write_long_record(long, &entry.name)?;
        }
        Ok(())
    }

    fn write_long_record(&mut self, path: &Path, name: &str) -> Result<(), SyncError> {
        fs::write(path, name).map_err(|e| io_err(path, e))?;
        self.emit(SyncEvent::WriteLongRecord {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn emit(&mut self, event: SyncEvent) {
        tracing::debug!("{event}");
        self.summary.record(&event);
        self.reporter.report(&event);
    }
}

// ---------------------------------------------------------------------------
// Filesystem helpers
// ---------------------------------------------------------------------------

/// Entry names of `dir`, sorted.
fn list_names(dir: &Path) -> Result<Vec<OsString>, SyncError> {
    let mut names = fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    names.sort();
    Ok(names)
}

/// `true` if anything, a dangling link included, exists at `path`.
fn lexists(path: &Path) -> Result<bool, SyncError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_err(path, err)),
    }
}

/// `true` if `path` is a directory and not a link to one.
fn is_real_dir(path: &Path) -> Result<bool, SyncError> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
