//! Forward cursor over a live engine or a snapshot.
//!
//! ```text
//! unpositioned ──next()──> positioned ──next()──> ... ──> exhausted
//!       |                      |                              |
//!       └──────────────── release() / drop ───────────────────┘
//!                                  |
//!                                  v
//!                               released
//! ```

use engine::{DbIterator, Error, Result};
use rocksdb::DBRawIterator;
use tracing::trace;

pub struct RocksIterator<'a> {
    start: Vec<u8>,
    seek_to_start: bool,
    iter: Option<DBRawIterator<'a>>,
}

impl<'a> RocksIterator<'a> {
    pub(crate) fn new(iter: DBRawIterator<'a>, start: &[u8]) -> Self {
        Self {
            start: start.to_vec(),
            seek_to_start: true,
            iter: Some(iter),
        }
    }

    /// Returns `true` once [`release`](DbIterator::release) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.iter.is_none()
    }
}

impl DbIterator for RocksIterator<'_> {
    fn next(&mut self) -> Result<bool> {
        let iter = self.iter.as_mut().ok_or(Error::Released("iterator"))?;

        if self.seek_to_start {
            iter.seek(&self.start);
            self.seek_to_start = false;
        } else if iter.valid() {
            iter.next();
        }

        if !iter.valid() {
            iter.status().map_err(Error::native)?;
        }
        Ok(iter.valid())
    }

    fn valid(&self) -> bool {
        self.iter.as_ref().map_or(false, |it| it.valid())
    }

    fn key(&self) -> Option<&[u8]> {
        self.iter.as_ref().and_then(|it| it.key())
    }

    fn value(&self) -> Option<&[u8]> {
        self.iter.as_ref().and_then(|it| it.value())
    }

    fn release(&mut self) -> Result<()> {
        let iter = self.iter.take().ok_or(Error::Released("iterator"))?;
        drop(iter);
        trace!("released iterator");
        Ok(())
    }
}
