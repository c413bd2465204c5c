//! Per-action events emitted while synchronising, and their consumers.
//!
//! The synchronizer holds a `&dyn Reporter` handed to it at construction;
//! verbosity is a choice of reporter, not a global flag.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One filesystem change made to the mirror tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    CreateDir { path: PathBuf },
    CreateLink { path: PathBuf, target: PathBuf },
    WriteLongRecord { path: PathBuf },
    RemoveFile { path: PathBuf },
    RemoveDir { path: PathBuf },
}

impl SyncEvent {
    /// Short tag printed in verbose mode.
    pub fn label(&self) -> &'static str {
        match self {
            SyncEvent::CreateDir { .. } => "DIR",
            SyncEvent::CreateLink { .. } => "LINK",
            SyncEvent::WriteLongRecord { .. } => "LONG",
            SyncEvent::RemoveFile { .. } => "RM",
            SyncEvent::RemoveDir { .. } => "RMDIR",
        }
    }

    /// The mirror path affected.
    pub fn path(&self) -> &Path {
        match self {
            SyncEvent::CreateDir { path }
            | SyncEvent::CreateLink { path, .. }
            | SyncEvent::WriteLongRecord { path }
            | SyncEvent::RemoveFile { path }
            | SyncEvent::RemoveDir { path } => path,
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.path().display())
    }
}

// ---------------------------------------------------------------------------
// Reporters
// ---------------------------------------------------------------------------

/// Receives every event as it happens.
pub trait Reporter {
    fn report(&self, event: &SyncEvent);
}

/// Discards events.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _event: &SyncEvent) {}
}

/// Prints `LABEL: path` to stderr, one line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&self, event: &SyncEvent) {
        eprintln!("{event}");
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counts of entries visited and changes made during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub entries_seen: usize,
    pub dirs_created: usize,
    pub links_created: usize,
    pub long_records_written: usize,
    pub files_removed: usize,
    pub dirs_removed: usize,
}

impl SyncSummary {
    pub fn record(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::CreateDir { .. } => self.dirs_created += 1,
            SyncEvent::CreateLink { .. } => self.links_created += 1,
            SyncEvent::WriteLongRecord { .. } => self.long_records_written += 1,
            SyncEvent::RemoveFile { .. } => self.files_removed += 1,
            SyncEvent::RemoveDir { .. } => self.dirs_removed += 1,
        }
    }

    /// Number of changes made to the mirror.
    pub fn changes(&self) -> usize {
        self.dirs_created
            + self.links_created
            + self.long_records_written
            + self.files_removed
            + self.dirs_removed
    }
}
