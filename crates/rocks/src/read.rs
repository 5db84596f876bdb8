//! Read path against the live state: `get()`, `seek()`, `multi_seek()` and
//! live iterators.
//!
//! Every returned key and value is an owned copy; nothing handed back borrows
//! a native buffer.

use engine::{Error, KvPair, Result};
use rocksdb::{DBRawIterator, ReadOptions};
use tracing::debug;

use crate::{RocksEngine, RocksIterator};

/// Copies the entry under `iter`, or reports why there is none.
///
/// An invalid iterator with a clean status means the scan ran off the end.
pub(crate) fn current_entry(iter: &DBRawIterator<'_>) -> Result<Option<KvPair>> {
    match iter.item() {
        Some((key, value)) => Ok(Some((key.to_vec(), value.to_vec()))),
        None => iter.status().map(|()| None).map_err(Error::native),
    }
}

impl RocksEngine {
    /// Looks up `key` in the live state.
    ///
    /// # Errors
    ///
    /// [`Error::Native`] on a RocksDB read failure, [`Error::Closed`] after
    /// [`close`](RocksEngine::close).
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let inner = self.inner()?;
        inner.db.get_opt(key, &inner.read_opts).map_err(Error::native)
    }

    /// Returns the first entry with a key `>= key`.
    ///
    /// The returned key need not equal `key`. The cursor used for the seek is
    /// released before this returns.
    pub fn seek(&self, key: &[u8]) -> Result<Option<KvPair>> {
        let inner = self.inner()?;
        let mut iter = inner.db.raw_iterator_opt(ReadOptions::default());
        iter.seek(key);
        current_entry(&iter)
    }

    /// Seeks every key in `keys` using one shared cursor.
    ///
    /// Keys are visited in ascending order so the cursor only moves forward,
    /// and a position already at or past the next target is reused without
    /// another native seek. Results are written back in input order.
    ///
    /// Absence is `Ok(None)` for that slot; a failed scan is `Err` for that
    /// slot. One slot's error does not affect the others.
    pub fn multi_seek(&self, keys: &[Vec<u8>]) -> Vec<Result<Option<KvPair>>> {
        let inner = match self.inner() {
            Ok(inner) => inner,
            Err(_) => return keys.iter().map(|_| Err(Error::Closed)).collect(),
        };

        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

        let mut results: Vec<Result<Option<KvPair>>> = keys.iter().map(|_| Ok(None)).collect();
        let mut iter = inner.db.raw_iterator_opt(ReadOptions::default());
        let mut positioned = false;
        let mut native_seeks = 0usize;

        for idx in order {
            let target = keys[idx].as_slice();

            // The previous target sorted at or before this one, so the cursor
            // sits on the first key >= that target. If that key is also
            // >= this target it is the answer here too; if the cursor ran off
            // the end cleanly, nothing >= this target exists either.
            let reusable = positioned
                && match iter.key() {
                    Some(current) => current >= target,
                    None => iter.status().is_ok(),
                };

            if !reusable {
                iter.seek(target);
                native_seeks += 1;
                positioned = true;
            }

            results[idx] = current_entry(&iter);
        }

        debug!(keys = keys.len(), native_seeks, "multi-seek");
        results
    }

    /// Creates a cursor over the live state starting at the first key
    /// `>= start`.
    ///
    /// RocksDB pins the state as of the cursor's creation, so entries
    /// committed afterwards are not observed.
    pub fn new_iterator(&self, start: &[u8]) -> Result<RocksIterator<'_>> {
        let inner = self.inner()?;
        let iter = inner.db.raw_iterator_opt(ReadOptions::default());
        Ok(RocksIterator::new(iter, start))
    }
}
