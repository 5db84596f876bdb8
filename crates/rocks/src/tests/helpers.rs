use crate::RocksEngine;
use anyhow::Result;
use engine::Batch;
use tempfile::{tempdir, TempDir};

/// Opens a default-configured engine in a fresh temporary directory.
///
/// The `TempDir` must outlive the engine.
pub fn open_temp() -> Result<(TempDir, RocksEngine)> {
    let dir = tempdir()?;
    let engine = RocksEngine::open_default(dir.path().join("db"))?;
    Ok((dir, engine))
}

/// Commits every pair as a single batch.
pub fn put_all(engine: &RocksEngine, pairs: &[(&str, &str)]) -> Result<()> {
    let mut batch = engine.new_batch();
    for (k, v) in pairs {
        batch.put(k.as_bytes(), v.as_bytes());
    }
    engine.write(batch)?;
    Ok(())
}

pub fn pair(k: &str, v: &str) -> (Vec<u8>, Vec<u8>) {
    (k.as_bytes().to_vec(), v.as_bytes().to_vec())
}
