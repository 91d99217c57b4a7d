//! # revstats — revision-file statistics engine
//!
//! `revstats` walks every revision (packed or unpacked) of a
//! filesystem-backed, Subversion-style repository, parses its revision
//! files to reconstruct the DAG of node-revisions and the representations
//! they share, and aggregates size, deduplication, and distribution
//! statistics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use revstats::{fs::FsBackend, query, query::EngineOptions};
//!
//! fn run(backend: &dyn FsBackend) -> revstats::error::Result<()> {
//!     let stats = query::get_stats(backend, EngineOptions::default(), None, None)?;
//!     println!("{} revisions read", stats.revision_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **[`fs`]** — the [`fs::FsBackend`] / [`fs::RevisionFile`] trait
//!   boundary an embedder implements against a real repository, plus the
//!   in-memory reference implementation used by this crate's own tests.
//! - **[`model`]** — the histogram, largest-changes, representation, and
//!   per-revision accumulators built up while reading.
//! - **[`parser`]** — decodes one revision's node tree, given an external
//!   node-revision decoder.
//! - **[`drivers`]** — the physical (offset-based) and logical
//!   (index-based) addressing-mode drivers that feed the parser.
//! - **[`query`]** — the top-level traversal and its [`query::get_stats`]
//!   entry point.
//! - **[`stats`]** — the [`stats::Stats`] result type and the aggregation
//!   pass that fills in its representation-derived fields.

pub mod drivers;
pub mod error;
pub mod fs;
pub mod logging;
pub mod model;
pub mod parser;
pub mod query;
pub mod stats;

pub use error::{Error, Result};
pub use query::{get_stats, EngineOptions, Query};
pub use stats::Stats;
