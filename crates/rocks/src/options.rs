//! Translation of a [`Config`] into native RocksDB option objects.
//!
//! Each `Config` field is passed through to exactly one native setter. The
//! only validation is the compression code, which must name an algorithm
//! RocksDB knows about.

use config::Config;
use engine::NativeError;
use rocksdb::{
    BlockBasedOptions, Cache, DBCompressionType, Env, Options, ReadOptions, WriteOptions,
};

/// Option objects built for one engine. Ownership moves into the engine,
/// which keeps them alive until the database handle has been dropped.
pub(crate) struct NativeOptions {
    pub(crate) opts: Options,
    pub(crate) read_opts: ReadOptions,
    pub(crate) write_opts: WriteOptions,
    pub(crate) table_opts: BlockBasedOptions,
    pub(crate) env: Env,
    pub(crate) cache: Cache,
}

/// Maps a native compression code onto the binding's enum.
pub(crate) fn compression_type(code: i32) -> Option<DBCompressionType> {
    match code {
        config::COMPRESSION_NONE => Some(DBCompressionType::None),
        config::COMPRESSION_SNAPPY => Some(DBCompressionType::Snappy),
        config::COMPRESSION_ZLIB => Some(DBCompressionType::Zlib),
        config::COMPRESSION_BZIP2 => Some(DBCompressionType::Bz2),
        config::COMPRESSION_LZ4 => Some(DBCompressionType::Lz4),
        config::COMPRESSION_LZ4HC => Some(DBCompressionType::Lz4hc),
        config::COMPRESSION_ZSTD => Some(DBCompressionType::Zstd),
        _ => None,
    }
}

impl NativeOptions {
    pub(crate) fn from_config(config: &Config) -> Result<Self, NativeError> {
        let compression = compression_type(config.compression_type)
            .ok_or_else(|| format!("unsupported compression type {}", config.compression_type))?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_error_if_exists(false);

        opts.set_compression_type(compression);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_open_files(config.max_open_files);
        opts.set_num_levels(config.num_levels);

        opts.set_max_write_buffer_number(config.max_write_buffer_number);
        opts.set_min_write_buffer_number_to_merge(config.min_write_buffer_number_to_merge);
        opts.set_level_zero_file_num_compaction_trigger(config.level0_file_num_compaction_trigger);
        opts.set_level_zero_slowdown_writes_trigger(config.level0_slowdown_writes_trigger);
        opts.set_level_zero_stop_writes_trigger(config.level0_stop_writes_trigger);
        opts.set_target_file_size_base(config.target_file_size_base);
        opts.set_target_file_size_multiplier(config.target_file_size_multiplier);
        opts.set_max_bytes_for_level_base(config.max_bytes_for_level_base);
        opts.set_max_bytes_for_level_multiplier(config.max_bytes_for_level_multiplier);

        opts.set_disable_auto_compactions(config.disable_auto_compactions);
        opts.set_use_fsync(config.use_fsync);
        #[allow(deprecated)]
        {
            opts.set_max_background_compactions(config.max_background_compactions);
            opts.set_max_background_flushes(config.max_background_flushes);
        }

        // The page cache is bypassed by switching every file path to direct I/O.
        opts.set_use_direct_reads(!config.allow_os_buffer);
        opts.set_use_direct_io_for_flush_and_compaction(!config.allow_os_buffer);

        let cache = Cache::new_lru_cache(config.cache_size);

        let mut table_opts = BlockBasedOptions::default();
        table_opts.set_block_size(config.block_size);
        table_opts.set_block_cache(&cache);
        table_opts.set_bloom_filter(f64::from(config.bloom_filter_size), false);
        opts.set_block_based_table_factory(&table_opts);

        let mut env = Env::new()?;
        env.set_background_threads(config.background_threads);
        env.set_high_priority_background_threads(config.high_priority_background_threads);
        opts.set_env(&env);

        let read_opts = ReadOptions::default();

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(!config.disable_data_sync);

        Ok(Self {
            opts,
            read_opts,
            write_opts,
            table_opts,
            env,
            cache,
        })
    }
}
