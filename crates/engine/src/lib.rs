//! # Engine - Storage Backend Contract
//!
//! The narrow interface a SQL layer expects from an ordered, persistent
//! key-value store, plus the registry through which backends are selected by
//! name at startup.
//!
//! ## Architecture
//!
//! ```text
//! Host (SQL layer)
//!   |
//!   |  Registry::open("rocksdb", path)
//!   v
//! ┌───────────────────────────────────────────────┐
//! │ Box<dyn Db>                                   │
//! │                                               │
//! │  get / seek / multi_seek   (live state)       │
//! │  new_batch → Box<dyn Batch> → commit()        │
//! │  get_snapshot → Box<dyn Snapshot + '_>        │
//! │                    |                          │
//! │                    v                          │
//! │           get / new_iterator                  │
//! │                    |                          │
//! │                    v                          │
//! │       Box<dyn DbIterator + '_>                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//!
//! Snapshots borrow their engine and iterators borrow their snapshot, so the
//! compiler rejects any attempt to close an engine while a snapshot is alive
//! or to release a snapshot while one of its iterators is alive. Every
//! handle-bearing object releases its native resources when dropped; the
//! explicit `release()` / `close()` calls exist so callers can observe errors
//! and so that a second release is reported instead of double-freeing.
//!
//! ## Ordering
//!
//! Keys are compared byte-wise lexicographically. This is the only ordering
//! iterators and seeks observe.
mod error;
mod registry;

use std::any::Any;
use std::path::Path;

pub use error::{Error, NativeError, Result};
pub use registry::Registry;

/// A key together with the value stored under it.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// An open key-value store.
///
/// Implementations must be safe for concurrent reads, concurrent snapshot
/// creation, and concurrent commits through a shared reference. Ordering
/// between concurrent commits is whatever the backend's write path provides.
pub trait Db: Send + Sync {
    /// Point lookup against the live state. `Ok(None)` means the key is absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Returns the first entry whose key is `>= key`, or `Ok(None)` if there
    /// is no such entry.
    fn seek(&self, key: &[u8]) -> Result<Option<KvPair>>;

    /// Seeks every key in `keys` against the live state in a single call.
    ///
    /// The result has one entry per input key, in input order. Each entry
    /// carries the same meaning as [`Db::seek`] for that key.
    fn multi_seek(&self, keys: &[Vec<u8>]) -> Vec<Result<Option<KvPair>>>;

    /// Allocates an empty batch owned by the caller.
    fn new_batch(&self) -> Box<dyn Batch>;

    /// Atomically applies every operation in `batch`, or none of them.
    ///
    /// The batch is consumed whether or not the commit succeeds.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBatchType`] if `batch` was not created by this kind of
    /// engine, [`Error::Native`] if the store rejects the write.
    fn commit(&self, batch: Box<dyn Batch>) -> Result<()>;

    /// Captures the current state as an immutable view.
    fn get_snapshot(&self) -> Result<Box<dyn Snapshot + '_>>;

    /// Releases the native store. A second call returns [`Error::Closed`].
    fn close(&mut self) -> Result<()>;
}

/// Pending writes that commit as one atomic unit.
///
/// Staging operations performs no I/O.
pub trait Batch: Send {
    /// Stages `key -> value`.
    fn put(&mut self, key: &[u8], value: &[u8]);

    /// Stages a deletion of `key`.
    fn delete(&mut self, key: &[u8]);

    /// Number of staged operations.
    fn len(&self) -> usize;

    /// `true` when nothing has been staged.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concrete type name, used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Hands the concrete batch back to the engine that commits it.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// A read-only, point-in-time view of a store.
///
/// Writes committed after the snapshot was taken are never visible through it.
pub trait Snapshot {
    /// Point lookup against the frozen view.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Creates a cursor over the frozen view, starting at the first key
    /// `>= start` once [`DbIterator::next`] is first called.
    fn new_iterator(&self, start: &[u8]) -> Result<Box<dyn DbIterator + '_>>;

    /// Releases the native view. A second call returns [`Error::Released`].
    fn release(&mut self) -> Result<()>;
}

/// A forward cursor over keys in ascending byte order.
///
/// A fresh iterator is unpositioned. The first [`next`](DbIterator::next)
/// seeks to the start key; later calls step forward. `key()`/`value()` are
/// `Some` only while the cursor is positioned on an entry.
pub trait DbIterator {
    /// Advances the cursor and reports whether it now points at an entry.
    ///
    /// # Errors
    ///
    /// Returns the native iterator status if the underlying scan failed, or
    /// [`Error::Released`] after [`release`](DbIterator::release).
    fn next(&mut self) -> Result<bool>;

    /// `true` while positioned on an entry.
    fn valid(&self) -> bool;

    /// Key at the current position.
    fn key(&self) -> Option<&[u8]>;

    /// Value at the current position.
    fn value(&self) -> Option<&[u8]>;

    /// Frees the native cursor. A second call returns [`Error::Released`].
    fn release(&mut self) -> Result<()>;
}

/// Factory that opens a store at a filesystem path.
pub trait Driver: Send + Sync {
    /// Opens (creating if needed) the store at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn Db>>;
}

#[cfg(test)]
mod tests;
