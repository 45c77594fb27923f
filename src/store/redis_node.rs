//! Redis-backed node over an async `redis` connection.

use std::collections::BTreeMap;

use async_trait::async_trait;
use redis::aio::{ConnectionLike, ConnectionManager, MultiplexedConnection};
use redis::sentinel::{SentinelClient, SentinelNodeConnectionInfo, SentinelServerType};
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use super::{NodeClient, ScanBatch};
use crate::config::{split_addr, Settings};
use crate::error::{Result, ViewerError};

/// Reconnect backoff: `factor * exponent_base^attempt` milliseconds
const BACKOFF_EXPONENT_BASE: u64 = 2;
const BACKOFF_FACTOR_MS: u64 = 100;

/// A single server reached through a cloneable async connection.
///
/// Both [`ConnectionManager`] (single node, cluster masters) and
/// [`MultiplexedConnection`] (sentinel-resolved master) are cheap to clone and
/// share one socket, so every call clones the handle instead of locking.
pub struct RedisNode<C> {
    addr: String,
    conn: C,
}

impl<C> RedisNode<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    pub fn new(addr: impl Into<String>, conn: C) -> Self {
        Self {
            addr: addr.into(),
            conn,
        }
    }

    /// Run a command and map the reply, keeping MOVED redirects typed.
    async fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let mut conn = self.conn.clone();
        cmd.query_async(&mut conn)
            .await
            .map_err(ViewerError::from_redis)
    }

    /// Addresses of every master from `CLUSTER NODES`.
    pub async fn cluster_masters(&self) -> Result<Vec<String>> {
        let nodes: String = self.query(&redis::cmd("CLUSTER").arg("NODES")).await?;
        let seed_host = split_addr(&self.addr)
            .map(|(host, _)| host)
            .unwrap_or_default();
        Ok(parse_cluster_masters(&nodes, &seed_host))
    }
}

#[async_trait]
impl<C> NodeClient for RedisNode<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    fn addr(&self) -> &str {
        &self.addr
    }

    async fn ping(&self) -> Result<()> {
        let _: String = self.query(&redis::cmd("PING")).await?;
        Ok(())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanBatch> {
        let mut cmd = redis::cmd("SCAN");
        cmd.arg(cursor);
        if !pattern.is_empty() {
            cmd.arg("MATCH").arg(pattern);
        }
        if count > 0 {
            cmd.arg("COUNT").arg(count);
        }
        let (cursor, keys): (u64, Vec<Vec<u8>>) = self.query(&cmd).await?;
        Ok(ScanBatch { cursor, keys })
    }

    async fn key_type(&self, key: &[u8]) -> Result<String> {
        self.query(redis::cmd("TYPE").arg(key)).await
    }

    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key)).await
    }

    async fn list_range(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.query(redis::cmd("LRANGE").arg(key).arg(0).arg(-1)).await
    }

    async fn set_members(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.query(redis::cmd("SMEMBERS").arg(key)).await
    }

    async fn sorted_set_range(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.query(redis::cmd("ZRANGE").arg(key).arg(0).arg(-1)).await
    }

    async fn hash_all(&self, key: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>> {
        self.query(redis::cmd("HGETALL").arg(key)).await
    }
}

fn redis_info(settings: &Settings, db: i64) -> RedisConnectionInfo {
    RedisConnectionInfo {
        db,
        username: settings.username.clone(),
        password: settings.password.clone(),
        ..Default::default()
    }
}

fn connection_info(addr: &str, settings: &Settings, db: i64) -> Result<ConnectionInfo> {
    let (host, port) = split_addr(addr)?;
    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host, port),
        redis: redis_info(settings, db),
    })
}

/// Connect to one server with the configured retry budget.
pub async fn connect_node(
    addr: &str,
    settings: &Settings,
    db: i64,
) -> Result<RedisNode<ConnectionManager>> {
    let client = redis::Client::open(connection_info(addr, settings, db)?)?;
    let manager = ConnectionManager::new_with_backoff(
        client,
        BACKOFF_EXPONENT_BASE,
        BACKOFF_FACTOR_MS,
        settings.max_retries,
    )
    .await?;
    tracing::debug!(addr, db, "connected to node");
    Ok(RedisNode::new(addr, manager))
}

/// Resolve the current master through the sentinels and connect to it.
pub async fn connect_sentinel(
    settings: &Settings,
    master_name: &str,
) -> Result<RedisNode<MultiplexedConnection>> {
    let sentinels = settings
        .addrs
        .iter()
        .map(|addr| {
            let (host, port) = split_addr(addr)?;
            Ok(ConnectionInfo {
                addr: ConnectionAddr::Tcp(host, port),
                redis: RedisConnectionInfo::default(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut client = SentinelClient::build(
        sentinels,
        master_name.to_string(),
        Some(SentinelNodeConnectionInfo {
            tls_mode: None,
            redis_connection_info: Some(redis_info(settings, settings.db)),
        }),
        SentinelServerType::Master,
    )?;
    let conn = client.get_async_connection().await?;
    tracing::debug!(master_name, "connected to sentinel master");
    Ok(RedisNode::new(format!("sentinel:{}", master_name), conn))
}

/// Discover the masters from the first reachable seed and connect to each.
pub async fn connect_cluster_masters(
    settings: &Settings,
) -> Result<Vec<RedisNode<ConnectionManager>>> {
    let mut last_error = None;
    for seed in &settings.addrs {
        let masters = match connect_node(seed, settings, 0).await {
            Ok(node) => node.cluster_masters().await,
            Err(e) => Err(e),
        };
        match masters {
            Ok(addrs) if !addrs.is_empty() => {
                tracing::info!(seed = %seed, masters = addrs.len(), "discovered cluster masters");
                let mut nodes = Vec::with_capacity(addrs.len());
                for addr in &addrs {
                    nodes.push(connect_node(addr, settings, 0).await?);
                }
                return Ok(nodes);
            }
            Ok(_) => {
                last_error = Some(ViewerError::Connection {
                    reason: format!("{} reported no cluster masters", seed),
                });
            }
            Err(e) => {
                tracing::warn!(seed = %seed, error = %e, "cluster seed unavailable");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| ViewerError::Connection {
        reason: "no cluster addresses configured".to_string(),
    }))
}

/// Extract master addresses from `CLUSTER NODES` output.
///
/// Line format: `<id> <ip:port@cport[,hostname]> <flags> <master> ...`.
/// Failed masters are skipped; an empty ip (the node answering about itself
/// on some versions) is replaced with `seed_host`.
fn parse_cluster_masters(nodes: &str, seed_host: &str) -> Vec<String> {
    nodes
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _id = fields.next()?;
            let endpoint = fields.next()?;
            let flags = fields.next()?;

            let flags: Vec<&str> = flags.split(',').collect();
            if !flags.contains(&"master") || flags.iter().any(|f| *f == "fail" || *f == "noaddr") {
                return None;
            }

            let addr = endpoint.split(['@', ',']).next()?;
            let (host, port) = addr.rsplit_once(':')?;
            let host = if host.is_empty() { seed_host } else { host };
            Some(format!("{}:{}", host, port))
        })
        .collect()
}
