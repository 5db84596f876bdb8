//! Factory that lets a host open RocksDB stores through the [`Registry`].

use config::Config;
use engine::{Db, Driver, Registry, Result};
use std::path::Path;
use std::sync::Arc;

use crate::RocksEngine;

/// Name the RocksDB driver is registered under.
pub const DRIVER_NAME: &str = "rocksdb";

/// Opens [`RocksEngine`]s with a fixed configuration.
///
/// `RocksDriver::default()` opens every store with [`Config::default`].
#[derive(Debug, Clone, Default)]
pub struct RocksDriver {
    config: Config,
}

impl RocksDriver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Driver for RocksDriver {
    fn open(&self, path: &Path) -> Result<Box<dyn Db>> {
        Ok(Box::new(RocksEngine::open(path, &self.config)?))
    }
}

/// Registers a default-configured [`RocksDriver`] as [`DRIVER_NAME`].
///
/// # Errors
///
/// [`engine::Error::DuplicateDriver`] if the name is already taken.
pub fn register(registry: &Registry) -> Result<()> {
    registry.register(DRIVER_NAME, Arc::new(RocksDriver::default()))
}
