use std::any::Any;
use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::RwLock;

use crate::*;

/// In-memory backend used to exercise the registry and trait plumbing.
pub struct MemDriver;

impl Driver for MemDriver {
    fn open(&self, _path: &Path) -> Result<Box<dyn Db>> {
        Ok(Box::new(MemDb {
            data: RwLock::new(BTreeMap::new()),
            closed: false,
        }))
    }
}

/// Backend whose `open` always fails.
pub struct FailingDriver;

impl Driver for FailingDriver {
    fn open(&self, path: &Path) -> Result<Box<dyn Db>> {
        Err(Error::Open {
            path: path.to_path_buf(),
            source: "refused".into(),
        })
    }
}

pub struct MemDb {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    closed: bool,
}

enum Op {
    Put(Vec<u8>, Vec<u8>),
    Del(Vec<u8>),
}

#[derive(Default)]
pub struct MemBatch {
    ops: Vec<Op>,
}

impl Batch for MemBatch {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(Op::Put(key.to_vec(), value.to_vec()));
    }

    fn delete(&mut self, key: &[u8]) {
        self.ops.push(Op::Del(key.to_vec()));
    }

    fn len(&self) -> usize {
        self.ops.len()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

struct MemSnapshot {
    data: Option<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl Snapshot for MemSnapshot {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let data = self.data.as_ref().ok_or(Error::Released("snapshot"))?;
        Ok(data.get(key).cloned())
    }

    fn new_iterator(&self, start: &[u8]) -> Result<Box<dyn DbIterator + '_>> {
        let data = self.data.as_ref().ok_or(Error::Released("snapshot"))?;
        let entries = data
            .range(start.to_vec()..)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(MemIterator {
            entries: Some(entries),
            pos: None,
        }))
    }

    fn release(&mut self) -> Result<()> {
        self.data.take().map(|_| ()).ok_or(Error::Released("snapshot"))
    }
}

/// Cursor over entries copied out of a snapshot.
struct MemIterator {
    entries: Option<Vec<KvPair>>,
    pos: Option<usize>,
}

impl MemIterator {
    fn current(&self) -> Option<&KvPair> {
        self.entries.as_ref()?.get(self.pos?)
    }
}

impl DbIterator for MemIterator {
    fn next(&mut self) -> Result<bool> {
        let len = self.entries.as_ref().ok_or(Error::Released("iterator"))?.len();
        let next = self.pos.map_or(0, |p| (p + 1).min(len));
        self.pos = Some(next);
        Ok(next < len)
    }

    fn valid(&self) -> bool {
        self.current().is_some()
    }

    fn key(&self) -> Option<&[u8]> {
        self.current().map(|(k, _)| k.as_slice())
    }

    fn value(&self) -> Option<&[u8]> {
        self.current().map(|(_, v)| v.as_slice())
    }

    fn release(&mut self) -> Result<()> {
        self.entries.take().map(|_| ()).ok_or(Error::Released("iterator"))
    }
}

impl Db for MemDb {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn seek(&self, key: &[u8]) -> Result<Option<KvPair>> {
        Ok(self
            .data
            .read()
            .range(key.to_vec()..)
            .next()
            .map(|(k, v)| (k.clone(), v.clone())))
    }

    fn multi_seek(&self, keys: &[Vec<u8>]) -> Vec<Result<Option<KvPair>>> {
        keys.iter().map(|k| self.seek(k)).collect()
    }

    fn new_batch(&self) -> Box<dyn Batch> {
        Box::new(MemBatch::default())
    }

    fn commit(&self, batch: Box<dyn Batch>) -> Result<()> {
        let name = batch.type_name();
        let batch = batch
            .into_any()
            .downcast::<MemBatch>()
            .map_err(|_| Error::InvalidBatchType(name))?;
        let mut data = self.data.write();
        for op in batch.ops {
            match op {
                Op::Put(k, v) => {
                    data.insert(k, v);
                }
                Op::Del(k) => {
                    data.remove(&k);
                }
            }
        }
        Ok(())
    }

    fn get_snapshot(&self) -> Result<Box<dyn Snapshot + '_>> {
        Ok(Box::new(MemSnapshot {
            data: Some(self.data.read().clone()),
        }))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.closed = true;
        Ok(())
    }
}
