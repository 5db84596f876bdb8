//! # Rocks - RocksDB Storage Adapter
//!
//! Implements the [`engine`] contract on top of an embedded RocksDB instance.
//! The adapter owns the native handle together with every option object,
//! cache and environment it allocated, and releases them in dependency order.
//!
//! ## Module Responsibilities
//!
//! | Module        | Purpose                                                   |
//! |---------------|-----------------------------------------------------------|
//! | `lib.rs`      | `RocksEngine` struct, `open()`, `close()`, `Db` impl, `Drop` |
//! | [`options`]   | `Config` → native options translation                     |
//! | [`read`]      | `get()`, `seek()`, `multi_seek()`, live iterators         |
//! | [`write`]     | `RocksBatch`, `new_batch()`, `write()`, `commit()`        |
//! | [`snapshot`]  | `RocksSnapshot` point-in-time views                       |
//! | [`iterator`]  | `RocksIterator` forward cursor                            |
//! | [`driver`]    | `RocksDriver` factory and registry hook                   |
//!
//! ## Resource Lifetimes
//!
//! ```text
//! RocksEngine ──borrows──> RocksSnapshot<'e> ──borrows──> RocksIterator<'s>
//!      |                                                      ^
//!      └──────────────────borrows (live iterator)─────────────┘
//! ```
//!
//! `close()` and `release()` take `&mut self`, so the borrow checker refuses
//! to release a parent while any child is still alive. Dropping any of these
//! types releases its native resources if that has not happened already.
//!
//! ## Concurrent Commits
//!
//! The adapter does not serialize commits. Each commit is atomic; the relative
//! order of concurrent commits is decided by RocksDB's write path.
mod driver;
mod iterator;
mod options;
mod read;
mod snapshot;
mod write;

use config::Config;
use engine::{Batch, Db, Error, KvPair, NativeError, Result, Snapshot};
use options::NativeOptions;
use rocksdb::{BlockBasedOptions, Cache, Env, Options, ReadOptions, WriteOptions, DB};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use driver::{register, RocksDriver, DRIVER_NAME};
pub use iterator::RocksIterator;
pub use snapshot::RocksSnapshot;
pub use write::RocksBatch;

/// Everything allocated for one open store.
///
/// Fields drop in declaration order: the database handle goes first, the
/// objects it depends on (options, environment, cache) after it.
pub(crate) struct Inner {
    pub(crate) db: DB,
    _opts: Options,
    pub(crate) read_opts: ReadOptions,
    pub(crate) write_opts: WriteOptions,
    _table_opts: BlockBasedOptions,
    _env: Env,
    _cache: Cache,
}

/// A RocksDB store opened at one filesystem path.
///
/// At most one `RocksEngine` may be open per path; RocksDB's lock file makes a
/// second open of the same path fail with [`Error::Open`].
pub struct RocksEngine {
    pub(crate) path: PathBuf,
    pub(crate) inner: Option<Inner>,
    pub(crate) snapshot_fill_cache: bool,
    pub(crate) sync_on_close: bool,
}

impl std::fmt::Debug for RocksEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksEngine")
            .field("path", &self.path)
            .field("open", &self.inner.is_some())
            .field("snapshot_fill_cache", &self.snapshot_fill_cache)
            .finish()
    }
}

impl RocksEngine {
    /// Opens (creating if needed) a store at `path` using the default
    /// configuration.
    pub fn open_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, &Config::default())
    }

    /// Opens (creating if needed) a store at `path`.
    ///
    /// # Steps
    ///
    /// 1. Create the directory at `path` (mode `0700` on Unix).
    /// 2. Translate `config` into native options, block cache and environment.
    /// 3. Open the database.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] carrying `path` if any step fails, including an
    /// unsupported compression code in `config`.
    pub fn open<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source: NativeError| Error::Open {
            path: path.clone(),
            source,
        };

        create_dir(&path).map_err(|e| open_err(Box::new(e)))?;

        let native = NativeOptions::from_config(config).map_err(open_err)?;
        let db = DB::open(&native.opts, &path).map_err(|e| open_err(Box::new(e)))?;

        info!(
            path = %path.display(),
            compression = config.compression_type,
            cache_size = config.cache_size,
            write_buffer_size = config.write_buffer_size,
            "opened rocksdb store"
        );

        let NativeOptions {
            opts,
            read_opts,
            write_opts,
            table_opts,
            env,
            cache,
        } = native;

        Ok(Self {
            path,
            inner: Some(Inner {
                db,
                _opts: opts,
                read_opts,
                write_opts,
                _table_opts: table_opts,
                _env: env,
                _cache: cache,
            }),
            snapshot_fill_cache: config.snapshot_fill_cache,
            sync_on_close: config.disable_data_sync,
        })
    }

    /// Returns the filesystem path this engine was opened at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` until [`close`](RocksEngine::close) has run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    pub(crate) fn inner(&self) -> Result<&Inner> {
        self.inner.as_ref().ok_or(Error::Closed)
    }

    /// Releases the database handle and every option object, environment and
    /// cache allocated by [`open`](RocksEngine::open).
    ///
    /// When commits were not synced (`disable_data_sync`), memtables are
    /// flushed first so that closing is a durability point. Native resources
    /// are released even if that flush fails.
    ///
    /// # Errors
    ///
    /// [`Error::Closed`] on a second call, [`Error::Close`] carrying the path
    /// if the final flush failed.
    pub fn close(&mut self) -> Result<()> {
        let inner = self.inner.take().ok_or(Error::Closed)?;

        let flushed = if self.sync_on_close {
            inner.db.flush()
        } else {
            Ok(())
        };
        drop(inner);
        info!(path = %self.path.display(), "closed rocksdb store");

        flushed.map_err(|e| Error::Close {
            path: self.path.clone(),
            source: Box::new(e),
        })
    }
}

#[cfg(unix)]
fn create_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

impl Db for RocksEngine {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        RocksEngine::get(self, key)
    }

    fn seek(&self, key: &[u8]) -> Result<Option<KvPair>> {
        RocksEngine::seek(self, key)
    }

    fn multi_seek(&self, keys: &[Vec<u8>]) -> Vec<Result<Option<KvPair>>> {
        RocksEngine::multi_seek(self, keys)
    }

    fn new_batch(&self) -> Box<dyn Batch> {
        Box::new(RocksEngine::new_batch(self))
    }

    fn commit(&self, batch: Box<dyn Batch>) -> Result<()> {
        RocksEngine::commit(self, batch)
    }

    fn get_snapshot(&self) -> Result<Box<dyn Snapshot + '_>> {
        Ok(Box::new(RocksEngine::get_snapshot(self)?))
    }

    fn close(&mut self) -> Result<()> {
        RocksEngine::close(self)
    }
}

/// Releases native resources for engines that were never closed explicitly.
impl Drop for RocksEngine {
    fn drop(&mut self) {
        if self.inner.is_some() {
            debug!(path = %self.path.display(), "closing rocksdb store on drop");
            if let Err(e) = self.close() {
                warn!(path = %self.path.display(), error = %e, "close on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests;
