use super::helpers::{open_temp, put_all};
use crate::*;
use anyhow::Result;
use engine::{Batch, Db, DbIterator, Error, Snapshot};
use tempfile::tempdir;

// --------------------- Isolation ---------------------

#[test]
fn snapshot_does_not_see_later_insert() -> Result<()> {
    let (_dir, engine) = open_temp()?;

    let snap = engine.get_snapshot()?;
    put_all(&engine, &[("k", "v")])?;

    assert!(snap.get(b"k")?.is_none());
    assert_eq!(engine.get(b"k")?, Some(b"v".to_vec()));
    Ok(())
}

#[test]
fn snapshot_keeps_prior_value_after_overwrite() -> Result<()> {
    let (_dir, engine) = open_temp()?;
    put_all(&engine, &[("k", "old")])?;

    let snap = engine.get_snapshot()?;
    put_all(&engine, &[("k", "new")])?;

    assert_eq!(snap.get(b"k")?, Some(b"old".to_vec()));
    assert_eq!(engine.get(b"k")?, Some(b"new".to_vec()));
    Ok(())
}

#[test]
fn snapshot_survives_delete() -> Result<()> {
    let (_dir, engine) = open_temp()?;
    put_all(&engine, &[("a", "1"), ("b", "2")])?;

    let snap = engine.get_snapshot()?;
    let mut batch = engine.new_batch();
    batch.delete(b"a");
    engine.write(batch)?;

    assert!(engine.get(b"a")?.is_none());
    assert_eq!(snap.get(b"a")?, Some(b"1".to_vec()));
    Ok(())
}

#[test]
fn snapshots_are_independent() -> Result<()> {
    let (_dir, engine) = open_temp()?;

    put_all(&engine, &[("k", "1")])?;
    let s1 = engine.get_snapshot()?;
    put_all(&engine, &[("k", "2")])?;
    let s2 = engine.get_snapshot()?;
    put_all(&engine, &[("k", "3")])?;

    assert_eq!(s1.get(b"k")?, Some(b"1".to_vec()));
    assert_eq!(s2.get(b"k")?, Some(b"2".to_vec()));
    assert_eq!(engine.get(b"k")?, Some(b"3".to_vec()));
    Ok(())
}

#[test]
fn snapshot_iterator_ignores_later_writes() -> Result<()> {
    let (_dir, engine) = open_temp()?;
    put_all(&engine, &[("a", "1"), ("c", "3")])?;

    let snap = engine.get_snapshot()?;
    put_all(&engine, &[("b", "2"), ("d", "4")])?;

    let mut it = snap.new_iterator(b"")?;
    let mut keys = Vec::new();
    while it.next()? {
        keys.push(it.key().unwrap_or_default().to_vec());
    }
    it.release()?;

    assert_eq!(keys, vec![b"a".to_vec(), b"c".to_vec()]);
    Ok(())
}

#[test]
fn snapshot_with_fill_cache_enabled() -> Result<()> {
    let dir = tempdir()?;
    let config = config::Config {
        snapshot_fill_cache: true,
        ..config::Config::default()
    };
    let engine = RocksEngine::open(dir.path().join("db"), &config)?;
    put_all(&engine, &[("a", "1")])?;

    let snap = engine.get_snapshot()?;
    assert_eq!(snap.get(b"a")?, Some(b"1".to_vec()));
    let mut it = snap.new_iterator(b"a")?;
    assert!(it.next()?);
    assert_eq!(it.value(), Some(&b"1"[..]));
    Ok(())
}

// --------------------- Release ---------------------

#[test]
fn release_twice_is_reported() -> Result<()> {
    let (_dir, engine) = open_temp()?;

    let mut snap = engine.get_snapshot()?;
    snap.release()?;
    assert!(snap.is_released());

    assert!(matches!(snap.release(), Err(Error::Released("snapshot"))));
    Ok(())
}

#[test]
fn reads_after_release_are_rejected() -> Result<()> {
    let (_dir, engine) = open_temp()?;
    put_all(&engine, &[("a", "1")])?;

    let mut snap = engine.get_snapshot()?;
    snap.release()?;

    assert!(matches!(snap.get(b"a"), Err(Error::Released(_))));
    assert!(matches!(snap.new_iterator(b""), Err(Error::Released(_))));
    Ok(())
}

#[test]
fn engine_closes_cleanly_after_snapshot_release() -> Result<()> {
    let (_dir, mut engine) = open_temp()?;
    put_all(&engine, &[("a", "1")])?;

    {
        let mut snap = engine.get_snapshot()?;
        let mut it = snap.new_iterator(b"")?;
        assert!(it.next()?);
        it.release()?;
        drop(it);
        snap.release()?;
    }

    engine.close()?;
    assert!(!engine.is_open());
    Ok(())
}

#[test]
fn snapshot_through_trait_object() -> Result<()> {
    let (_dir, engine) = open_temp()?;
    let db: &dyn Db = &engine;

    let mut batch = db.new_batch();
    batch.put(b"a", b"1");
    db.commit(batch)?;

    let mut snap = db.get_snapshot()?;

    let mut batch = db.new_batch();
    batch.delete(b"a");
    db.commit(batch)?;

    assert!(db.get(b"a")?.is_none());
    assert_eq!(snap.get(b"a")?, Some(b"1".to_vec()));
    snap.release()?;
    Ok(())
}

#[test]
fn snapshot_after_close_is_rejected() -> Result<()> {
    let (_dir, mut engine) = open_temp()?;
    engine.close()?;
    assert!(matches!(engine.get_snapshot(), Err(Error::Closed)));
    Ok(())
}
