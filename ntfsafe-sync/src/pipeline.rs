//! Sync pipeline entrypoint used by the CLI.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use ntfsafe_core::MetadataSource;

use crate::error::{io_err, SyncError};
use crate::report::{Reporter, SyncSummary};
use crate::tree::{SyncOptions, TreeSynchronizer};

/// Outcome of one complete run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Mirror paths kept at the top level of `dest`.
    pub top_level_paths: usize,
    pub summary: SyncSummary,
}

/// Validate both roots and mirror `source` into `dest`.
pub fn run(
    source: &Path,
    dest: &Path,
    options: &SyncOptions,
    reporter: &dyn Reporter,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    let (source, dest) = resolve_roots(source, dest)?;
    finish(TreeSynchronizer::new(options, reporter), source, dest, started_at)
}

/// [`run`] with a caller-supplied metadata-string producer.
pub fn run_with_metadata<M: MetadataSource>(
    metadata: M,
    source: &Path,
    dest: &Path,
    options: &SyncOptions,
    reporter: &dyn Reporter,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    let (source, dest) = resolve_roots(source, dest)?;
    let syncer = TreeSynchronizer::with_metadata(metadata, options, reporter);
    finish(syncer, source, dest, started_at)
}

fn finish<M: MetadataSource>(
    mut syncer: TreeSynchronizer<'_, M>,
    source: PathBuf,
    dest: PathBuf,
    started_at: DateTime<Utc>,
) -> Result<SyncReport, SyncError> {
    let created = syncer.sync(&source, &dest)?;
    let summary = syncer.into_summary();

    tracing::info!(
        "synced {} -> {}: {} entries, {} changes",
        source.display(),
        dest.display(),
        summary.entries_seen,
        summary.changes()
    );

    Ok(SyncReport {
        source,
        dest,
        started_at,
        finished_at: Utc::now(),
        top_level_paths: created.len(),
        summary,
    })
}

/// Check that both roots are directories and do not overlap.
///
/// Returns them made absolute and free of `.`/`..` components without
/// resolving symlinks, so link targets written into the mirror keep the
/// caller's spelling of the source path.
pub fn resolve_roots(source: &Path, dest: &Path) -> Result<(PathBuf, PathBuf), SyncError> {
    for path in [source, dest] {
        if !path.is_dir() {
            return Err(SyncError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
    }

    let source = normalize(&std::path::absolute(source).map_err(|e| io_err(source, e))?);
    let dest = normalize(&std::path::absolute(dest).map_err(|e| io_err(dest, e))?);

    let canonical_source = source.canonicalize().map_err(|e| io_err(&source, e))?;
    let canonical_dest = dest.canonicalize().map_err(|e| io_err(&dest, e))?;
    if canonical_source.starts_with(&canonical_dest) || canonical_dest.starts_with(&canonical_source)
    {
        return Err(SyncError::OverlappingTrees {
            source_dir: source,
            dest_dir: dest,
        });
    }

    Ok((source, dest))
}

/// Drop `.` and fold `..` into its parent, textually. `..` at the root
/// stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str());
            }
        }
    }
    out
}
