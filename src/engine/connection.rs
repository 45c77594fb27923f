//! Connection - the one shared handle to the store

use std::sync::Arc;

use super::keyspace::{Cluster, Keyspace, Standalone};
use crate::config::{Settings, Topology};
use crate::error::{Result, ViewerError};
use crate::store::{self, NodeClient};

/// Topology-transparent handle, shared by every scan and count.
pub struct Connection {
    keyspace: Arc<dyn Keyspace>,
}

impl Connection {
    pub fn new(keyspace: Arc<dyn Keyspace>) -> Self {
        Self { keyspace }
    }

    /// Connect according to the settings' topology, then probe with PING.
    ///
    /// Every failure here is fatal and reported as a connection error.
    pub async fn open(settings: &Settings) -> Result<Self> {
        let keyspace = build_keyspace(settings)
            .await
            .map_err(as_connection_error)?;
        let connection = Self::new(keyspace);
        connection.probe().await?;
        tracing::info!(keyspace = %connection.keyspace.describe(), "connected");
        Ok(connection)
    }

    pub async fn probe(&self) -> Result<()> {
        self.keyspace.ping().await.map_err(as_connection_error)
    }

    pub fn keyspace(&self) -> Arc<dyn Keyspace> {
        Arc::clone(&self.keyspace)
    }

    /// Release the handle. Connections close once the last in-flight task
    /// holding the keyspace finishes.
    pub fn close(self) {
        tracing::info!(keyspace = %self.keyspace.describe(), "connection closed");
    }
}

fn as_connection_error(error: ViewerError) -> ViewerError {
    match error {
        ViewerError::Connection { .. } => error,
        other => ViewerError::Connection {
            reason: other.to_string(),
        },
    }
}

async fn build_keyspace(settings: &Settings) -> Result<Arc<dyn Keyspace>> {
    match settings.topology() {
        Topology::Single => {
            let addr = settings.addrs.first().ok_or_else(|| ViewerError::Config {
                reason: "no redis address configured".to_string(),
            })?;
            let node = store::connect_node(addr, settings, settings.db).await?;
            Ok(Arc::new(Standalone::new(Arc::new(node))))
        }
        Topology::Sentinel { master_name } => {
            let node = store::connect_sentinel(settings, &master_name).await?;
            Ok(Arc::new(Standalone::new(Arc::new(node))))
        }
        Topology::Cluster => {
            let masters = store::connect_cluster_masters(settings)
                .await?
                .into_iter()
                .map(|node| Arc::new(node) as Arc<dyn NodeClient>)
                .collect();
            Ok(Arc::new(Cluster::new(masters, settings.max_redirects)))
        }
    }
}
