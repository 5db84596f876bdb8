//! # Config - Storage Engine Tuning Parameters
//!
//! A flat, declarative record of the knobs handed to the native store when an
//! engine is opened. Every field maps onto exactly one native option; nothing
//! here is derived or computed from anything else.
//!
//! Building a [`Config`] never fails. Values the native store cannot accept
//! (for example an unknown compression code) are rejected when the engine is
//! opened, not here.
//!
//! ## Example
//!
//! ```
//! use config::{Config, COMPRESSION_LZ4};
//!
//! let config = Config {
//!     compression_type: COMPRESSION_LZ4,
//!     cache_size: 64 * 1024 * 1024,
//!     ..Config::default()
//! };
//! assert_eq!(config.block_size, 64 * 1024);
//! ```

/// No block compression.
pub const COMPRESSION_NONE: i32 = 0;
/// Snappy block compression.
pub const COMPRESSION_SNAPPY: i32 = 1;
/// Zlib block compression.
pub const COMPRESSION_ZLIB: i32 = 2;
/// Bzip2 block compression.
pub const COMPRESSION_BZIP2: i32 = 3;
/// LZ4 block compression.
pub const COMPRESSION_LZ4: i32 = 4;
/// LZ4HC block compression.
pub const COMPRESSION_LZ4HC: i32 = 5;
/// Zstandard block compression.
pub const COMPRESSION_ZSTD: i32 = 7;

const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;

/// Tuning parameters for one storage engine instance.
///
/// Immutable once handed to an engine: the engine copies what it needs at
/// open time, so changing a `Config` afterwards only affects engines opened
/// later.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Per-block compression algorithm, as a native compression code
    /// (see the `COMPRESSION_*` constants).
    pub compression_type: i32,
    /// Bytes buffered in memory before a memtable is flushed.
    pub write_buffer_size: usize,
    /// Ceiling on files the native store keeps open. `-1` means unlimited.
    pub max_open_files: i32,
    /// Number of levels in the LSM tree.
    pub num_levels: i32,

    pub max_write_buffer_number: i32,
    pub min_write_buffer_number_to_merge: i32,

    /// Level-0 file count that schedules a compaction.
    pub level0_file_num_compaction_trigger: i32,
    /// Level-0 file count at which writes are slowed down.
    pub level0_slowdown_writes_trigger: i32,
    /// Level-0 file count at which writes stop until compaction catches up.
    pub level0_stop_writes_trigger: i32,

    pub target_file_size_base: u64,
    pub target_file_size_multiplier: i32,
    pub max_bytes_for_level_base: u64,
    pub max_bytes_for_level_multiplier: f64,

    pub disable_auto_compactions: bool,
    /// When `true`, commits return without waiting for the log to reach disk.
    ///
    /// Off by default, so every commit syncs the write-ahead log before it
    /// returns. This trades commit latency for durability of each commit; set
    /// it to get the unsynced commits plain RocksDB write options give, with a
    /// flush when the engine closes.
    pub disable_data_sync: bool,
    /// Use `fsync` instead of `fdatasync` when syncing files.
    pub use_fsync: bool,

    pub max_background_compactions: i32,
    pub max_background_flushes: i32,

    /// When `false`, reads and flush/compaction I/O bypass the OS page cache.
    pub allow_os_buffer: bool,

    /// On-disk block size in bytes.
    pub block_size: usize,
    /// Capacity of the LRU block cache in bytes.
    pub cache_size: usize,
    /// Bits per key for the bloom filter that short-circuits absent lookups.
    pub bloom_filter_size: i32,

    /// Low-priority (compaction) threads in the shared environment.
    pub background_threads: i32,
    /// High-priority (flush) threads in the shared environment.
    pub high_priority_background_threads: i32,

    /// Whether snapshot reads populate the block cache.
    pub snapshot_fill_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compression_type: COMPRESSION_NONE,
            write_buffer_size: 64 * MIB,
            max_open_files: 1024,
            num_levels: 7,
            max_write_buffer_number: 2,
            min_write_buffer_number_to_merge: 1,
            level0_file_num_compaction_trigger: 8,
            level0_slowdown_writes_trigger: 16,
            level0_stop_writes_trigger: 64,
            target_file_size_base: 64 * MIB as u64,
            target_file_size_multiplier: 1,
            max_bytes_for_level_base: 512 * MIB as u64,
            max_bytes_for_level_multiplier: 8.0,
            disable_auto_compactions: false,
            disable_data_sync: false,
            use_fsync: false,
            max_background_compactions: 4,
            max_background_flushes: 1,
            allow_os_buffer: true,
            block_size: 64 * KIB,
            cache_size: 4 * MIB,
            bloom_filter_size: 10,
            background_threads: 16,
            high_priority_background_threads: 1,
            snapshot_fill_cache: false,
        }
    }
}

impl Config {
    /// Returns the default configuration. Same as [`Config::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
