//! Point-in-time views over a [`RocksEngine`].
//!
//! A snapshot pins the sequence number current at creation; reads through it
//! ignore every later commit. Creating one copies no data.
//!
//! Whether snapshot reads populate the block cache is fixed per engine by
//! `Config::snapshot_fill_cache`, so that scan-heavy snapshot reads can be
//! kept from evicting hot blocks.

use engine::{DbIterator, Error, Result, Snapshot};
use rocksdb::{ReadOptions, DB};
use tracing::debug;

use crate::{RocksEngine, RocksIterator};

struct SnapshotState<'a> {
    // Dropped before `snap`.
    read_opts: ReadOptions,
    snap: rocksdb::Snapshot<'a>,
}

pub struct RocksSnapshot<'a> {
    db: &'a DB,
    fill_cache: bool,
    state: Option<SnapshotState<'a>>,
}

impl std::fmt::Debug for RocksSnapshot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksSnapshot")
            .field("fill_cache", &self.fill_cache)
            .field("released", &self.state.is_none())
            .finish()
    }
}

impl RocksEngine {
    /// Captures the current state as an immutable view.
    ///
    /// # Errors
    ///
    /// [`Error::Closed`] after [`close`](RocksEngine::close).
    pub fn get_snapshot(&self) -> Result<RocksSnapshot<'_>> {
        let inner = self.inner()?;
        let snap = inner.db.snapshot();
        let read_opts = snapshot_read_options(&snap, self.snapshot_fill_cache);
        debug!(fill_cache = self.snapshot_fill_cache, "created snapshot");

        Ok(RocksSnapshot {
            db: &inner.db,
            fill_cache: self.snapshot_fill_cache,
            state: Some(SnapshotState { read_opts, snap }),
        })
    }
}

fn snapshot_read_options(snap: &rocksdb::Snapshot<'_>, fill_cache: bool) -> ReadOptions {
    let mut opts = ReadOptions::default();
    opts.set_fill_cache(fill_cache);
    opts.set_snapshot(snap);
    opts
}

impl<'a> RocksSnapshot<'a> {
    /// Returns `true` once [`release`](Snapshot::release) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }

    fn state(&self) -> Result<&SnapshotState<'a>> {
        self.state.as_ref().ok_or(Error::Released("snapshot"))
    }
}

impl Snapshot for RocksSnapshot<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let state = self.state()?;
        self.db.get_opt(key, &state.read_opts).map_err(Error::native)
    }

    fn new_iterator(&self, start: &[u8]) -> Result<Box<dyn DbIterator + '_>> {
        let state = self.state()?;
        let opts = snapshot_read_options(&state.snap, self.fill_cache);
        let iter = self.db.raw_iterator_opt(opts);
        Ok(Box::new(RocksIterator::new(iter, start)))
    }

    fn release(&mut self) -> Result<()> {
        let state = self.state.take().ok_or(Error::Released("snapshot"))?;
        drop(state);
        debug!("released snapshot");
        Ok(())
    }
}
