//! ntfsafe — mirror a directory tree as symlinks with NTFS-safe names.
//!
//! # Usage
//!
//! ```text
//! ntfsafe [-v|--verbose] [--json] [--max-len <N>] [--follow-dir-links] <SOURCE> <DEST>
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::sync::SyncArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "ntfsafe",
    version,
    about = "Mirror a directory tree as symlinks whose names fit a 255-character limit",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    cli.sync.run()
}

/// Library logs go to stderr; `RUST_LOG` overrides the default `warn`.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
