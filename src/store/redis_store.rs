//! Redis-backed store
//!
//! Single-node deployments go through a `ConnectionManager` (reconnects on
//! its own); cluster deployments use the async cluster connection. Both are
//! cheap to clone, so every command clones the handle out of the lock and
//! never holds the lock across I/O.

use async_trait::async_trait;
use log::info;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::FromRedisValue;
use tokio::sync::RwLock;

use super::{KeyKind, QueueStore};
use crate::config::BoardConfig;
use crate::error::StoreError;

#[derive(Clone)]
enum Connection {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

pub struct RedisStore {
    connection: RwLock<Option<Connection>>,
}

impl RedisStore {
    /// Connects using the store settings from the configuration.
    pub async fn connect(config: &BoardConfig) -> Result<Self, StoreError> {
        let url = config.redis_url();

        let connection = if config.redis_is_cluster {
            let client = ClusterClient::new(vec![url])?;
            Connection::Cluster(client.get_async_connection().await?)
        } else {
            let client = redis::Client::open(url)?;
            Connection::Single(ConnectionManager::new(client).await?)
        };

        info!(
            "Connected to redis at {}:{} (cluster: {}, tls: {})",
            config.redis_host, config.redis_port, config.redis_is_cluster, config.redis_use_tls
        );

        Ok(Self {
            connection: RwLock::new(Some(connection)),
        })
    }

    async fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T, StoreError> {
        let connection = self
            .connection
            .read()
            .await
            .clone()
            .ok_or(StoreError::Disconnected)?;

        match connection {
            Connection::Single(mut conn) => Ok(cmd.query_async(&mut conn).await?),
            Connection::Cluster(mut conn) => Ok(cmd.query_async(&mut conn).await?),
        }
    }
}

#[async_trait]
impl QueueStore for RedisStore {
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        self.query(redis::cmd("KEYS").arg(pattern)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _: String = self.query(&redis::cmd("PING")).await?;
        Ok(())
    }

    async fn len(&self, key: &str, kind: KeyKind) -> Result<u64, StoreError> {
        let command = match kind {
            KeyKind::List => "LLEN",
            KeyKind::SortedSet => "ZCARD",
        };
        self.query(redis::cmd(command).arg(key)).await
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        match self.connection.write().await.take() {
            Some(_) => Ok(()),
            None => Err(StoreError::Disconnected),
        }
    }
}
