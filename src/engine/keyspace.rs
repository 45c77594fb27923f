//! Keyspace topologies
//!
//! A [`Keyspace`] is what the scan and count engines see: something that can
//! stream the keys of one page and count matches, regardless of how many
//! servers sit behind it.
//!
//! - [`Standalone`]: one node (plain or sentinel-resolved master). A page is a
//!   single `SCAN cursor MATCH p COUNT limit`.
//! - [`Cluster`]: every master scanned concurrently, sharing one counter that
//!   stops all producers once the page (or count cap) is exceeded. Pages are
//!   approximate: the cursor is applied to each master independently.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{Result, ViewerError};
use crate::store::NodeClient;

/// A key produced by a scan, with the node it was found on
#[derive(Clone)]
pub struct FoundKey {
    /// Exact key bytes, passed back unchanged to TYPE and the value reads
    pub key: Vec<u8>,
    pub node: Arc<dyn NodeClient>,
}

impl std::fmt::Debug for FoundKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoundKey")
            .field("key", &String::from_utf8_lossy(&self.key))
            .field("node", &self.node.addr())
            .finish()
    }
}

/// Producer half of a page scan
pub type KeySender = mpsc::Sender<Result<FoundKey>>;

#[async_trait]
pub trait Keyspace: Send + Sync {
    /// Human-readable description for logs
    fn describe(&self) -> String;

    /// Liveness probe against every node
    async fn ping(&self) -> Result<()>;

    /// Stream up to `limit` keys matching `pattern`, starting at `cursor`.
    ///
    /// Errors are sent down the channel. The producer stops as soon as the
    /// receiver is dropped, and the channel closes when this returns.
    async fn scan_page(&self, cursor: u64, pattern: &str, limit: usize, tx: KeySender);

    /// Count keys matching `pattern`, stopping once the count exceeds `cap`.
    ///
    /// A result above `cap` means "more than cap"; the exact excess is
    /// meaningless.
    async fn count_matches(&self, pattern: &str, cap: usize) -> Result<usize>;

    /// Node answering for `addr`, used to follow MOVED replies
    fn node_for(&self, _addr: &str) -> Option<Arc<dyn NodeClient>> {
        None
    }

    /// How many MOVED hops a single read may follow
    fn max_redirects(&self) -> usize {
        0
    }
}

// ═══════════════════════════════════════════════════════════════
// Standalone
// ═══════════════════════════════════════════════════════════════

/// One node: a plain server or the master a sentinel resolved
pub struct Standalone {
    node: Arc<dyn NodeClient>,
}

impl Standalone {
    pub fn new(node: Arc<dyn NodeClient>) -> Self {
        Self { node }
    }
}

#[async_trait]
impl Keyspace for Standalone {
    fn describe(&self) -> String {
        format!("single node {}", self.node.addr())
    }

    async fn ping(&self) -> Result<()> {
        self.node.ping().await
    }

    async fn scan_page(&self, cursor: u64, pattern: &str, limit: usize, tx: KeySender) {
        let batch = match self.node.scan(cursor, pattern, limit).await {
            Ok(batch) => batch,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
        };

        for key in batch.keys.into_iter().take(limit) {
            let found = FoundKey {
                key,
                node: Arc::clone(&self.node),
            };
            if tx.send(Ok(found)).await.is_err() {
                return;
            }
        }
    }

    async fn count_matches(&self, pattern: &str, cap: usize) -> Result<usize> {
        let counter = AtomicUsize::new(0);
        count_node(self.node.as_ref(), pattern, cap, &counter).await?;
        Ok(counter.load(Ordering::SeqCst))
    }
}

// ═══════════════════════════════════════════════════════════════
// Cluster
// ═══════════════════════════════════════════════════════════════

/// Every master of a cluster
pub struct Cluster {
    masters: Vec<Arc<dyn NodeClient>>,
    max_redirects: usize,
}

impl Cluster {
    pub fn new(masters: Vec<Arc<dyn NodeClient>>, max_redirects: usize) -> Self {
        Self {
            masters,
            max_redirects,
        }
    }
}

#[async_trait]
impl Keyspace for Cluster {
    fn describe(&self) -> String {
        let addrs: Vec<&str> = self.masters.iter().map(|m| m.addr()).collect();
        format!("cluster [{}]", addrs.join(", "))
    }

    async fn ping(&self) -> Result<()> {
        for master in &self.masters {
            master.ping().await?;
        }
        Ok(())
    }

    async fn scan_page(&self, cursor: u64, pattern: &str, limit: usize, tx: KeySender) {
        let processed = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        for master in &self.masters {
            let master = Arc::clone(master);
            let processed = Arc::clone(&processed);
            let pattern = pattern.to_string();
            let tx = tx.clone();
            tasks.spawn(async move {
                scan_master(master, cursor, &pattern, limit, &processed, &tx).await
            });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.unwrap_or_else(|e| {
                Err(ViewerError::Scan {
                    reason: e.to_string(),
                })
            });
            if let Err(e) = outcome {
                if failure.is_none() {
                    tasks.abort_all();
                    failure = Some(e);
                }
            }
        }

        if let Some(e) = failure {
            let _ = tx.send(Err(e)).await;
        }
    }

    async fn count_matches(&self, pattern: &str, cap: usize) -> Result<usize> {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        for master in &self.masters {
            let master = Arc::clone(master);
            let counter = Arc::clone(&counter);
            let pattern = pattern.to_string();
            tasks.spawn(async move { count_node(master.as_ref(), &pattern, cap, &counter).await });
        }

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.unwrap_or_else(|e| {
                Err(ViewerError::Count {
                    reason: e.to_string(),
                })
            });
            // Dropping the set aborts the remaining masters
            outcome?;
        }

        Ok(counter.load(Ordering::SeqCst))
    }

    fn node_for(&self, addr: &str) -> Option<Arc<dyn NodeClient>> {
        self.masters.iter().find(|m| m.addr() == addr).cloned()
    }

    fn max_redirects(&self) -> usize {
        self.max_redirects
    }
}

/// Walk one master from `cursor` until the shared page counter passes `limit`.
async fn scan_master(
    master: Arc<dyn NodeClient>,
    mut cursor: u64,
    pattern: &str,
    limit: usize,
    processed: &AtomicUsize,
    tx: &KeySender,
) -> Result<()> {
    loop {
        let batch = master.scan(cursor, pattern, 0).await?;
        for key in batch.keys {
            if processed.fetch_add(1, Ordering::SeqCst) >= limit {
                return Ok(());
            }
            let found = FoundKey {
                key,
                node: Arc::clone(&master),
            };
            if tx.send(Ok(found)).await.is_err() {
                return Ok(());
            }
        }
        cursor = batch.cursor;
        if cursor == 0 {
            return Ok(());
        }
    }
}

/// Iterate one node from cursor 0, adding matches to `counter` until it
/// exceeds `cap` or the node is exhausted.
async fn count_node(
    node: &dyn NodeClient,
    pattern: &str,
    cap: usize,
    counter: &AtomicUsize,
) -> Result<()> {
    let mut cursor = 0;
    loop {
        let batch = node.scan(cursor, pattern, 0).await?;
        for _ in &batch.keys {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 > cap {
                return Ok(());
            }
        }
        cursor = batch.cursor;
        if cursor == 0 {
            return Ok(());
        }
    }
}
