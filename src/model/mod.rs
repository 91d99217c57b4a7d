//! Accumulators and per-revision data built up while a repository is
//! walked, and the `Stats` result produced from them.
//!
//! # Key Types
//!
//! - [`histogram::Histogram`] — log2-bucketed size counters.
//! - [`largest_changes::LargestChanges`] — bounded top-N biggest changes.
//! - [`rep::Rep`] / [`rep::intern`] — representation dedup.
//! - [`revision::RevisionInfo`] — per-revision accumulator.

pub mod histogram;
pub mod largest_changes;
pub mod rep;
pub mod revision;
