//! The top-level traversal driver: owns the per-revision array and the
//! in-progress [`Stats`], dispatches each pack/revision to the right
//! addressing-mode driver, and paces progress/cancel callbacks.

use crate::drivers::{logical, physical};
use crate::error::{Error, Result};
use crate::fs::{FsBackend, Revnum};
use crate::model::revision::RevisionInfo;
use crate::stats::Stats;

/// Engine-level knobs that `spec.md` leaves as implementation details.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Byte step used by the logical driver's linear index walk.
    pub page_size: u64,
    /// Capacity of the [`crate::model::largest_changes::LargestChanges`]
    /// list carried on the result.
    pub largest_changes_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            page_size: 64 * 1024,
            largest_changes_capacity: 64,
        }
    }
}

/// Owns the filesystem handle, the per-revision accumulator array, and the
/// global [`Stats`] result being built up over the course of a traversal.
pub struct Query<'a> {
    fs: &'a dyn FsBackend,
    options: EngineOptions,
    revisions: Vec<RevisionInfo>,
    stats: Stats,
}

impl<'a> Query<'a> {
    /// Prepares a traversal over `fs`, pre-allocating one [`RevisionInfo`]
    /// per revision from `0` to `fs.youngest_revision()` inclusive so that
    /// rep-sharing references to any already-processed revision always
    /// land on a valid slot.
    pub fn new(fs: &'a dyn FsBackend, options: EngineOptions) -> Self {
        let youngest = fs.youngest_revision();
        let revisions = (0..=youngest).map(RevisionInfo::new).collect();
        let stats = Stats::new(options.largest_changes_capacity);
        Query {
            fs,
            options,
            revisions,
            stats,
        }
    }

    /// Runs the traversal to completion, invoking `progress` at shard
    /// boundaries (or every 1000 revisions, for an unsharded tail) and
    /// `cancel` at least once per revision and per logical index block.
    ///
    /// On success, every revision has been read and [`Stats::aggregate`]
    /// has run. On failure, no partial result is returned — per `spec.md`
    /// §7, every error is fatal to the whole traversal.
    pub fn run(
        self,
        mut progress: Option<&mut dyn FnMut(Revnum) -> Result<()>>,
        mut cancel: Option<&mut dyn FnMut() -> bool>,
    ) -> Result<Stats> {
        let Query {
            fs,
            options,
            mut revisions,
            mut stats,
        } = self;

        let youngest = fs.youngest_revision();
        let min_unpacked = fs.min_unpacked_revision();
        let shard_size = fs.shard_size();
        let logical = fs.use_logical_addressing();

        let mut cancel_fn = || -> Result<()> {
            match cancel.as_mut() {
                Some(cb) => {
                    if cb() {
                        Err(Error::Cancelled)
                    } else {
                        Ok(())
                    }
                }
                None => Ok(()),
            }
        };

        if shard_size > 0 {
            let mut base = 0;
            while base < min_unpacked {
                if logical {
                    logical::process_shard(
                        fs,
                        base,
                        &mut revisions,
                        &mut stats,
                        options.page_size,
                        &mut cancel_fn,
                    )?;
                } else {
                    physical::process_pack(fs, base, &mut revisions, &mut stats, &mut cancel_fn)?;
                }
                if let Some(cb) = progress.as_mut() {
                    cb(base)?;
                }
                base += shard_size;
            }
        }

        let progress_interval = if shard_size > 0 { shard_size } else { 1000 };
        let mut since_progress = 0u64;
        let mut rev = min_unpacked;
        while rev <= youngest {
            if logical {
                logical::process_shard(
                    fs,
                    rev,
                    &mut revisions,
                    &mut stats,
                    options.page_size,
                    &mut cancel_fn,
                )?;
            } else {
                physical::process_rev(fs, rev, &mut revisions, &mut stats, &mut cancel_fn)?;
            }
            since_progress += 1;
            if since_progress >= progress_interval {
                if let Some(cb) = progress.as_mut() {
                    cb(rev)?;
                }
                since_progress = 0;
            }
            rev += 1;
        }

        stats.aggregate(&revisions);
        Ok(stats)
    }
}

/// Runs a full statistics pass over `fs`.
///
/// `progress` is called with the base revision of each completed pack (or
/// every 1000th unpacked revision, absent sharding); `cancel` is polled at
/// least once per revision. Either callback can abort the traversal —
/// `progress` by returning `Err`, `cancel` by returning `true` — in which
/// case no partial [`Stats`] is returned.
pub fn get_stats(
    fs: &dyn FsBackend,
    options: EngineOptions,
    progress: Option<&mut dyn FnMut(Revnum) -> Result<()>>,
    cancel: Option<&mut dyn FnMut() -> bool>,
) -> Result<Stats> {
    Query::new(fs, options).run(progress, cancel)
}
