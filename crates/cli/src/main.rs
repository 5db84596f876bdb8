//! # CLI - Interactive Storage Shell
//!
//! A REPL over any storage driver in the registry. Reads commands from stdin,
//! runs them against the opened store and prints results to stdout. Works
//! both interactively and with commands piped in.
//!
//! ## Commands
//!
//! ```text
//! SET key value          Commit a one-operation batch
//! DEL key                Commit a one-operation delete
//! BATCH k=v k2=v2 -k3    Commit several puts (k=v) and deletes (-k) atomically
//! GET key                Point lookup (prints value or "(nil)")
//! SEEK key               First entry with key >= `key`
//! MSEEK key [key ...]    Seek many keys in one call, results in input order
//! SNAP                   Take a snapshot (replacing any held one)
//! SGET key               Point lookup against the held snapshot
//! SCAN [start]           Iterate the held snapshot (or a fresh one)
//! RELEASE                Release the held snapshot
//! EXIT / QUIT            Shut down gracefully
//! ```
//!
//! ## Configuration
//!
//! All settings are controlled via environment variables:
//!
//! ```text
//! ROCKS_DRIVER               registered driver name     (default: "rocksdb")
//! ROCKS_PATH                 store directory            (default: "data/rocks")
//! ROCKS_CACHE_MB             block cache size in MiB    (default: 4)
//! ROCKS_COMPRESSION          native compression code    (default: 0 = none)
//! ROCKS_SYNC                 sync every commit          (default: "true")
//! ROCKS_SNAPSHOT_FILL_CACHE  snapshot reads fill cache  (default: "false")
//! RUST_LOG                   log filter, logs go to stderr (default: "warn")
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! started (driver=rocksdb, path=data/rocks, cache=4MiB, compression=0, sync=true)
//! > BATCH a=1 b=2
//! OK (2 ops)
//! > SEEK aa
//! b -> 2
//! > MSEEK a z b
//! a -> a = 1
//! z -> (nil)
//! b -> b = 2
//! > EXIT
//! bye
//! ```

use anyhow::{Context, Result};
use config::Config;
use engine::{Batch, Db, DbIterator, KvPair, Registry, Snapshot};
use rocks::RocksDriver;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn config_from_env() -> Config {
    let defaults = Config::default();
    let cache_mb: usize = env_or("ROCKS_CACHE_MB", "4").parse().unwrap_or(4);
    let sync: bool = env_or("ROCKS_SYNC", "true").parse().unwrap_or(true);

    Config {
        cache_size: cache_mb * 1024 * 1024,
        compression_type: env_or("ROCKS_COMPRESSION", "0")
            .parse()
            .unwrap_or(defaults.compression_type),
        disable_data_sync: !sync,
        snapshot_fill_cache: env_or("ROCKS_SNAPSHOT_FILL_CACHE", "false")
            .parse()
            .unwrap_or(false),
        ..defaults
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn show(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn prompt() {
    print!("> ");
    io::stdout().flush().ok();
}

/// Collects every entry from `start` onwards, releasing the cursor afterwards.
fn scan(snap: &dyn Snapshot, start: &[u8]) -> engine::Result<Vec<KvPair>> {
    let mut it = snap.new_iterator(start)?;
    let mut entries = Vec::new();
    while it.next()? {
        if let (Some(k), Some(v)) = (it.key(), it.value()) {
            entries.push((k.to_vec(), v.to_vec()));
        }
    }
    it.release()?;
    Ok(entries)
}

/// Stages `k=v` as a put and `-k` as a delete. Returns `false` on a malformed op.
fn stage(batch: &mut dyn Batch, op: &str) -> bool {
    if let Some(key) = op.strip_prefix('-') {
        if key.is_empty() {
            return false;
        }
        batch.delete(key.as_bytes());
        return true;
    }
    match op.split_once('=') {
        Some((k, v)) if !k.is_empty() => {
            batch.put(k.as_bytes(), v.as_bytes());
            true
        }
        _ => false,
    }
}

fn main() -> Result<()> {
    init_tracing();

    let driver_name = env_or("ROCKS_DRIVER", rocks::DRIVER_NAME);
    let path = PathBuf::from(env_or("ROCKS_PATH", "data/rocks"));
    let config = config_from_env();

    let registry = Registry::global();
    registry.register(
        rocks::DRIVER_NAME,
        Arc::new(RocksDriver::new(config.clone())),
    )?;

    let mut db = registry
        .open(&driver_name, &path)
        .with_context(|| format!("opening {} store at {}", driver_name, path.display()))?;

    println!(
        "started (driver={}, path={}, cache={}MiB, compression={}, sync={})",
        driver_name,
        path.display(),
        config.cache_size / (1024 * 1024),
        config.compression_type,
        !config.disable_data_sync
    );
    println!("Commands: SET key value | DEL key | BATCH k=v -k ... | GET key | SEEK key");
    println!("          MSEEK key... | SNAP | SGET key | SCAN [start] | RELEASE | EXIT");
    info!(driver = %driver_name, path = %path.display(), "shell ready");
    prompt();

    run(db.as_ref())?;
    debug!("input closed, shutting down");

    db.close()
        .with_context(|| format!("closing store at {}", path.display()))?;
    Ok(())
}

fn run(db: &dyn Db) -> Result<()> {
    let mut held: Option<Box<dyn Snapshot + '_>> = None;
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "SET" => {
                    if let Some(k) = parts.next() {
                        let v: String = parts.collect::<Vec<&str>>().join(" ");
                        if v.is_empty() {
                            println!("ERR usage: SET key value");
                        } else {
                            let mut batch = db.new_batch();
                            batch.put(k.as_bytes(), v.as_bytes());
                            match db.commit(batch) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR set failed: {}", e),
                            }
                        }
                    } else {
                        println!("ERR usage: SET key value");
                    }
                }
                "DEL" => {
                    if let Some(k) = parts.next() {
                        let mut batch = db.new_batch();
                        batch.delete(k.as_bytes());
                        match db.commit(batch) {
                            Ok(()) => println!("OK"),
                            Err(e) => println!("ERR del failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: DEL key");
                    }
                }
                "BATCH" => {
                    let mut batch = db.new_batch();
                    let mut malformed = None;
                    for op in parts {
                        if !stage(batch.as_mut(), op) {
                            malformed = Some(op);
                            break;
                        }
                    }
                    match malformed {
                        Some(op) => println!("ERR bad batch op {:?} (use k=v or -k)", op),
                        None if batch.is_empty() => println!("ERR usage: BATCH k=v -k ..."),
                        None => {
                            let ops = batch.len();
                            match db.commit(batch) {
                                Ok(()) => println!("OK ({} ops)", ops),
                                Err(e) => println!("ERR batch failed: {}", e),
                            }
                        }
                    }
                }
                "GET" => {
                    if let Some(k) = parts.next() {
                        match db.get(k.as_bytes()) {
                            Ok(Some(v)) => println!("{}", show(&v)),
                            Ok(None) => println!("(nil)"),
                            Err(e) => println!("ERR read failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "SEEK" => {
                    if let Some(k) = parts.next() {
                        match db.seek(k.as_bytes()) {
                            Ok(Some((fk, v))) => println!("{} -> {}", show(&fk), show(&v)),
                            Ok(None) => println!("(nil)"),
                            Err(e) => println!("ERR seek failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: SEEK key");
                    }
                }
                "MSEEK" => {
                    let keys: Vec<Vec<u8>> = parts.map(|k| k.as_bytes().to_vec()).collect();
                    if keys.is_empty() {
                        println!("ERR usage: MSEEK key [key ...]");
                    } else {
                        for (key, result) in keys.iter().zip(db.multi_seek(&keys)) {
                            match result {
                                Ok(Some((fk, v))) => {
                                    println!("{} -> {} = {}", show(key), show(&fk), show(&v))
                                }
                                Ok(None) => println!("{} -> (nil)", show(key)),
                                Err(e) => println!("{} -> ERR {}", show(key), e),
                            }
                        }
                    }
                }
                "SNAP" => {
                    if let Some(mut old) = held.take() {
                        old.release().ok();
                    }
                    match db.get_snapshot() {
                        Ok(snap) => {
                            held = Some(snap);
                            println!("OK");
                        }
                        Err(e) => println!("ERR snapshot failed: {}", e),
                    }
                }
                "SGET" => match (held.as_ref(), parts.next()) {
                    (None, _) => println!("ERR no snapshot held (use SNAP)"),
                    (Some(_), None) => println!("ERR usage: SGET key"),
                    (Some(snap), Some(k)) => match snap.get(k.as_bytes()) {
                        Ok(Some(v)) => println!("{}", show(&v)),
                        Ok(None) => println!("(nil)"),
                        Err(e) => println!("ERR read failed: {}", e),
                    },
                },
                "SCAN" => {
                    let start = parts.next().unwrap_or("").as_bytes();
                    let result = match held.as_ref() {
                        Some(snap) => scan(snap.as_ref(), start),
                        None => db.get_snapshot().and_then(|snap| scan(snap.as_ref(), start)),
                    };
                    match result {
                        Ok(entries) if entries.is_empty() => println!("(empty)"),
                        Ok(entries) => {
                            for (k, v) in &entries {
                                println!("{} -> {}", show(k), show(v));
                            }
                            println!("({} entries)", entries.len());
                        }
                        Err(e) => println!("ERR scan failed: {}", e),
                    }
                }
                "RELEASE" => match held.take() {
                    Some(mut snap) => match snap.release() {
                        Ok(()) => println!("OK"),
                        Err(e) => println!("ERR release failed: {}", e),
                    },
                    None => println!("ERR no snapshot held"),
                },
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        prompt();
    }

    if let Some(mut snap) = held.take() {
        snap.release()?;
    }
    Ok(())
}
