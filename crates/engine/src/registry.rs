//! Name → driver lookup used by the host to pick a backend at startup.
//!
//! Backends are registered explicitly (`rocks::register(&registry)`), never
//! as a side effect of linking. The process-wide instance from
//! [`Registry::global`] can be emptied with [`Registry::reset`] in tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::{Db, Driver, Error, Result};

/// Drivers keyed by the name a host selects them with.
#[derive(Default)]
pub struct Registry {
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("drivers", &self.names())
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created empty on first use.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Registers `driver` under `name`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateDriver`] if `name` is already taken.
    pub fn register(&self, name: &str, driver: Arc<dyn Driver>) -> Result<()> {
        let mut drivers = self.drivers.write();
        if drivers.contains_key(name) {
            return Err(Error::DuplicateDriver(name.to_string()));
        }
        drivers.insert(name.to_string(), driver);
        debug!(driver = name, "registered storage driver");
        Ok(())
    }

    /// Returns the driver registered as `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.read().get(name).cloned()
    }

    /// Opens a store at `path` with the driver registered as `name`.
    pub fn open(&self, name: &str, path: &Path) -> Result<Box<dyn Db>> {
        // Clone the driver out so the lock is not held across the open.
        let driver = self
            .get(name)
            .ok_or_else(|| Error::UnknownDriver(name.to_string()))?;
        driver.open(path)
    }

    /// Registered names in ascending order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes every registered driver.
    pub fn reset(&self) {
        self.drivers.write().clear();
    }
}
