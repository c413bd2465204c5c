//! # ntfsafe-sync
//!
//! Mirror a source tree as a tree of symbolic links with length-bounded names.
//!
//! Call [`pipeline::run`] to validate two directories and synchronise them,
//! or drive a [`TreeSynchronizer`] directly for one pass over an already
//! validated pair.

pub mod error;
pub mod pipeline;
pub mod report;
pub mod tree;

pub use error::SyncError;
pub use pipeline::SyncReport;
pub use report::{Reporter, SilentReporter, StderrReporter, SyncEvent, SyncSummary};
pub use tree::{CreatedSet, SyncOptions, TreeSynchronizer};
