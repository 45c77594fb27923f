//! Store Layer - Single-node command surface
//!
//! A [`NodeClient`] is one Redis server: the handful of read commands the
//! viewer issues against it. Topology (single, sentinel, cluster) is built on
//! top of this in [`crate::engine::keyspace`].
//!
//! | Node | Use Case |
//! |------|----------|
//! | [`RedisNode`] | Production, over a `redis` async connection |
//! | [`MemoryNode`] | Tests, in-process keyspace with SCAN cursor semantics |

mod memory;
mod redis_node;

pub use memory::{MemoryNode, MemoryValue};
pub use redis_node::{connect_cluster_masters, connect_node, connect_sentinel, RedisNode};

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

/// One page of SCAN output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanBatch {
    /// Cursor for the next call; 0 once iteration is complete
    pub cursor: u64,
    /// Raw key bytes; Redis keys are binary-safe
    pub keys: Vec<Vec<u8>>,
}

/// Read commands against a single server.
///
/// Keys and values travel as bytes. Decoding for display happens in the
/// engine, so a non-UTF-8 key or value only affects its own entry.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// `host:port` of the node
    fn addr(&self) -> &str;

    async fn ping(&self) -> Result<()>;

    /// `SCAN cursor [MATCH pattern] [COUNT count]`.
    ///
    /// An empty pattern matches every key; a zero count uses the server default.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanBatch>;

    /// `TYPE key`
    async fn key_type(&self, key: &[u8]) -> Result<String>;

    /// `GET key`
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// `LRANGE key 0 -1`
    async fn list_range(&self, key: &[u8]) -> Result<Vec<Vec<u8>>>;

    /// `SMEMBERS key`
    async fn set_members(&self, key: &[u8]) -> Result<Vec<Vec<u8>>>;

    /// `ZRANGE key 0 -1`
    async fn sorted_set_range(&self, key: &[u8]) -> Result<Vec<Vec<u8>>>;

    /// `HGETALL key`
    async fn hash_all(&self, key: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>>;
}
