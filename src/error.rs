//! Error types for the revision-file statistics engine.

use std::io;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can interrupt a traversal.
///
/// All variants are fatal to the traversal in progress: `get_stats` never
/// returns a partial [`crate::stats::Stats`] alongside an `Err`.
#[derive(Debug, Error)]
pub enum Error {
    /// A revision blob, header trailer, or changed-paths section did not
    /// have the shape the parser expects.
    #[error("corrupt repository data: {0}")]
    Corrupt(String),

    /// Reading or seeking within a pack or rev file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The cancellation callback signalled that the traversal should stop.
    #[error("traversal cancelled")]
    Cancelled,

    /// A p2l index entry referenced a range outside the file, or otherwise
    /// could not be trusted (unlike unknown item types or zero-size
    /// entries, which are skipped rather than treated as fatal).
    #[error("inconsistent logical index: {0}")]
    IndexInconsistent(String),
}
