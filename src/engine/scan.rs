//! ScanEngine
//!
//! One page of keys: the keyspace streams [`FoundKey`]s through a bounded
//! channel while this side fetches and renders each value. Closing the
//! channel ends the page.

use tokio::sync::mpsc;

use super::entry::KeyEntry;
use super::keyspace::{FoundKey, Keyspace};
use super::value::{render_value, ValueKind};
use crate::error::{Result, ViewerError};
use crate::store::NodeClient;

/// Keys in flight between producers and the value fetcher
pub const KEY_CHANNEL_CAPACITY: usize = 16;

/// Which page to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Page index; the SCAN cursor is `offset * limit`
    pub offset: u64,
    /// Glob pattern, empty for every key
    pub pattern: String,
    pub limit: usize,
}

impl ScanRequest {
    pub fn cursor(&self) -> u64 {
        self.offset.saturating_mul(self.limit as u64)
    }
}

/// Fetch one page of entries.
///
/// Keys whose value cannot be read become error entries. A failure of the
/// scan itself aborts the page.
pub async fn scan(keyspace: &dyn Keyspace, request: &ScanRequest) -> Result<Vec<KeyEntry>> {
    let (tx, rx) = mpsc::channel(KEY_CHANNEL_CAPACITY);
    let produce = keyspace.scan_page(request.cursor(), &request.pattern, request.limit, tx);
    let consume = collect_entries(keyspace, rx);
    let ((), entries) = tokio::join!(produce, consume);

    let entries = entries?;
    tracing::debug!(
        cursor = request.cursor(),
        pattern = %request.pattern,
        found = entries.len(),
        "scan page complete"
    );
    Ok(entries)
}

async fn collect_entries(
    keyspace: &dyn Keyspace,
    mut rx: mpsc::Receiver<Result<FoundKey>>,
) -> Result<Vec<KeyEntry>> {
    let mut entries = Vec::new();
    while let Some(found) = rx.recv().await {
        let found = found.map_err(|e| ViewerError::Scan {
            reason: e.to_string(),
        })?;
        entries.push(materialize(keyspace, found).await);
    }
    Ok(entries)
}

/// Read and render one key, following MOVED replies within the budget.
///
/// The raw key goes to the server; the entry shows it decoded lossily.
pub async fn materialize(keyspace: &dyn Keyspace, found: FoundKey) -> KeyEntry {
    let FoundKey { key: raw, mut node } = found;
    let key = String::from_utf8_lossy(&raw).into_owned();
    let mut hops = 0;

    loop {
        let (key_type, fetched) = fetch_once(node.as_ref(), &raw).await;
        let error = match fetched {
            Ok(text) => return KeyEntry::loaded(key, key_type, text),
            Err(e) => e,
        };

        let ViewerError::Moved { addr } = &error else {
            tracing::debug!(key = %key, error = %error, "value fetch failed");
            return KeyEntry::failed(key, key_type, &error);
        };

        if hops >= keyspace.max_redirects() {
            return KeyEntry::failed(
                key.clone(),
                key_type,
                &ViewerError::TooManyRedirects { key },
            );
        }
        match keyspace.node_for(addr) {
            Some(next) => {
                tracing::debug!(key = %key, to = %addr, "following redirect");
                node = next;
                hops += 1;
            }
            None => return KeyEntry::failed(key, key_type, &error),
        }
    }
}

async fn fetch_once(node: &dyn NodeClient, key: &[u8]) -> (String, Result<String>) {
    let key_type = match node.key_type(key).await {
        Ok(t) => t,
        Err(e) => return (String::new(), Err(e)),
    };
    let rendered = ValueKind::from_type_name(&key_type)
        .fetch(node, key)
        .await
        .map(render_value);
    (key_type, rendered)
}
