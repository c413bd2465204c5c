//! `ntfsafe <source> <dest>` — build or refresh the mirror tree.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ntfsafe_core::{EncoderLimits, MAX_LEN};
use ntfsafe_sync::{
    pipeline, Reporter, SilentReporter, StderrReporter, SyncError, SyncOptions, SyncReport,
};

/// Arguments for a sync run.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Print one line per directory, link, long-name record or removal.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a machine-readable run report on stdout.
    #[arg(long)]
    pub json: bool,

    /// Maximum length of generated names, in characters.
    #[arg(long, value_name = "N", default_value_t = MAX_LEN)]
    pub max_len: usize,

    /// Mirror symlinks to directories as directories and descend into them.
    #[arg(long)]
    pub follow_dir_links: bool,

    /// The source directory.
    pub source: PathBuf,

    /// Destination for the symlink tree.
    pub dest: PathBuf,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let options = SyncOptions {
            limits: EncoderLimits {
                max_len: self.max_len,
                ..EncoderLimits::default()
            },
            follow_dir_links: self.follow_dir_links,
        };
        let reporter: &dyn Reporter = if self.verbose {
            &StderrReporter
        } else {
            &SilentReporter
        };

        let report =
            pipeline::run(&self.source, &self.dest, &options, reporter).map_err(|err| match err {
                // Already phrased for the user.
                SyncError::NotADirectory { .. } => anyhow::Error::from(err),
                other => anyhow::Error::from(other).context(format!(
                    "sync of '{}' into '{}' failed",
                    self.source.display(),
                    self.dest.display()
                )),
            })?;

        if self.json {
            let json = serde_json::to_string_pretty(&report).context("serialize run report")?;
            println!("{json}");
        } else if self.verbose {
            print_summary(&report);
        }

        Ok(())
    }
}

fn print_summary(report: &SyncReport) {
    let s = &report.summary;
    if s.changes() == 0 {
        eprintln!("✓ '{}' up to date ({} entries)", report.dest.display(), s.entries_seen);
        return;
    }
    eprintln!(
        "✓ '{}' synced ({} entries: {} dirs, {} links, {} long records created; {} files, {} dirs removed)",
        report.dest.display(),
        s.entries_seen,
        s.dirs_created,
        s.links_created,
        s.long_records_written,
        s.files_removed,
        s.dirs_removed
    );
}
