//! Write path: `RocksBatch`, `new_batch()`, `write()` and `commit()`.
//!
//! All mutations go through a batch. Staging touches only the in-memory
//! batch; a single native write applies every staged operation atomically.

use engine::{Batch, Error, Result};
use rocksdb::WriteBatch;
use std::any::Any;
use tracing::{debug, warn};

use crate::RocksEngine;

/// Pending writes for a [`RocksEngine`].
#[derive(Default)]
pub struct RocksBatch {
    inner: WriteBatch,
}

impl std::fmt::Debug for RocksBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksBatch")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl RocksBatch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Batch for RocksBatch {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.inner.put(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.inner.delete(key);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl RocksEngine {
    /// Allocates an empty batch.
    #[must_use]
    pub fn new_batch(&self) -> RocksBatch {
        RocksBatch::new()
    }

    /// Atomically applies `batch`. The batch is consumed either way.
    ///
    /// # Errors
    ///
    /// [`Error::Native`] if RocksDB rejects the write, [`Error::Closed`] after
    /// [`close`](RocksEngine::close). Nothing from the batch is applied in
    /// either case.
    pub fn write(&self, batch: RocksBatch) -> Result<()> {
        let inner = self.inner()?;
        let ops = batch.inner.len();
        inner
            .db
            .write_opt(batch.inner, &inner.write_opts)
            .map_err(Error::native)?;
        debug!(ops, "committed batch");
        Ok(())
    }

    /// Type-checks `batch` and applies it with [`write`](RocksEngine::write).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBatchType`] if `batch` is not a [`RocksBatch`]; the
    /// foreign batch is dropped before returning.
    pub fn commit(&self, batch: Box<dyn Batch>) -> Result<()> {
        let batch_type = batch.type_name();
        match batch.into_any().downcast::<RocksBatch>() {
            Ok(batch) => self.write(*batch),
            Err(_) => {
                warn!(batch_type, "rejected batch from another engine");
                Err(Error::InvalidBatchType(batch_type))
            }
        }
    }
}
