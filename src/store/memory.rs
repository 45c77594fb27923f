//! In-memory node
//!
//! Mirrors the SCAN contract closely enough for the engines: the cursor is a
//! position in the sorted keyspace, COUNT bounds how many keys are examined per
//! call (not how many match), and a cursor of 0 ends the iteration.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{NodeClient, ScanBatch};
use crate::error::{Result, ViewerError};

/// Keys examined per SCAN call when no COUNT is given (the server default)
const DEFAULT_SCAN_COUNT: usize = 10;

/// A stored value, tagged by its Redis type
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryValue {
    String(String),
    /// A string value that is not valid UTF-8
    Bytes(Vec<u8>),
    List(Vec<String>),
    Set(Vec<String>),
    SortedSet(Vec<String>),
    Hash(BTreeMap<String, String>),
    /// Any other type, by its `TYPE` name (e.g. `stream`)
    Other(String),
}

impl MemoryValue {
    fn type_name(&self) -> &str {
        match self {
            MemoryValue::String(_) | MemoryValue::Bytes(_) => "string",
            MemoryValue::List(_) => "list",
            MemoryValue::Set(_) => "set",
            MemoryValue::SortedSet(_) => "zset",
            MemoryValue::Hash(_) => "hash",
            MemoryValue::Other(name) => name,
        }
    }
}

/// In-process node for tests
pub struct MemoryNode {
    addr: String,
    data: RwLock<BTreeMap<Vec<u8>, MemoryValue>>,
    /// key -> address answering MOVED for reads of that key
    moved: RwLock<HashMap<Vec<u8>, String>>,
    available: AtomicBool,
}

impl MemoryNode {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            data: RwLock::new(BTreeMap::new()),
            moved: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Builder form of [`MemoryNode::insert`]
    pub fn with(self, key: impl Into<Vec<u8>>, value: MemoryValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&self, key: impl Into<Vec<u8>>, value: MemoryValue) {
        self.data.write().insert(key.into(), value);
    }

    /// Answer reads of `key` with `MOVED <addr>`.
    pub fn redirect(&self, key: impl Into<Vec<u8>>, addr: impl Into<String>) {
        self.moved.write().insert(key.into(), addr.into());
    }

    /// Make every command fail as if the server went away.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ViewerError::Connection {
                reason: format!("{} is unavailable", self.addr),
            })
        }
    }

    /// Look up a key for a read, honoring redirects.
    fn read(&self, key: &[u8]) -> Result<Option<MemoryValue>> {
        self.check_available()?;
        if let Some(addr) = self.moved.read().get(key) {
            return Err(ViewerError::Moved { addr: addr.clone() });
        }
        Ok(self.data.read().get(key).cloned())
    }

    fn wrong_type() -> ViewerError {
        ViewerError::Redis(redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "WRONGTYPE Operation against a key holding the wrong kind of value",
        )))
    }
}

fn pattern_matches(pattern: &str, key: &[u8]) -> bool {
    if pattern.is_empty() {
        return true;
    }
    match glob::Pattern::new(pattern) {
        Ok(p) => p.matches(&String::from_utf8_lossy(key)),
        Err(_) => pattern.as_bytes() == key,
    }
}

fn bytes(items: Vec<String>) -> Vec<Vec<u8>> {
    items.into_iter().map(String::into_bytes).collect()
}

#[async_trait]
impl NodeClient for MemoryNode {
    fn addr(&self) -> &str {
        &self.addr
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanBatch> {
        self.check_available()?;
        let count = if count == 0 { DEFAULT_SCAN_COUNT } else { count };
        let data = self.data.read();
        let start = usize::try_from(cursor).unwrap_or(usize::MAX);

        let mut examined = 0;
        let mut keys = Vec::new();
        for key in data.keys().skip(start).take(count) {
            examined += 1;
            if pattern_matches(pattern, key) {
                keys.push(key.clone());
            }
        }

        let next = start.saturating_add(examined);
        let cursor = if examined == 0 || next >= data.len() {
            0
        } else {
            next as u64
        };
        Ok(ScanBatch { cursor, keys })
    }

    async fn key_type(&self, key: &[u8]) -> Result<String> {
        Ok(self
            .read(key)?
            .map(|v| v.type_name().to_string())
            .unwrap_or_else(|| "none".to_string()))
    }

    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.read(key)? {
            Some(MemoryValue::String(s)) => Ok(Some(s.into_bytes())),
            Some(MemoryValue::Bytes(b)) => Ok(Some(b)),
            Some(_) => Err(Self::wrong_type()),
            None => Ok(None),
        }
    }

    async fn list_range(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        match self.read(key)? {
            Some(MemoryValue::List(items)) => Ok(bytes(items)),
            Some(_) => Err(Self::wrong_type()),
            None => Ok(Vec::new()),
        }
    }

    async fn set_members(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        match self.read(key)? {
            Some(MemoryValue::Set(items)) => Ok(bytes(items)),
            Some(_) => Err(Self::wrong_type()),
            None => Ok(Vec::new()),
        }
    }

    async fn sorted_set_range(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        match self.read(key)? {
            Some(MemoryValue::SortedSet(items)) => Ok(bytes(items)),
            Some(_) => Err(Self::wrong_type()),
            None => Ok(Vec::new()),
        }
    }

    async fn hash_all(&self, key: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>> {
        match self.read(key)? {
            Some(MemoryValue::Hash(fields)) => Ok(fields
                .into_iter()
                .map(|(field, value)| (field.into_bytes(), value.into_bytes()))
                .collect()),
            Some(_) => Err(Self::wrong_type()),
            None => Ok(BTreeMap::new()),
        }
    }
}
