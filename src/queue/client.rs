//! Queue client handles
//!
//! A handle is bound to one queue name and one protocol variant. Handles
//! share the process-wide store connection and must be closed explicitly.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::protocol::Protocol;
use super::results::JobCounts;
use crate::error::ClientError;
use crate::store::QueueStore;

/// What a handle is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueIdentity {
    pub name: String,
    pub protocol: Protocol,
    pub prefix: String,
}

impl QueueIdentity {
    /// Full store key for one of this queue's sub-keys
    pub fn key(&self, suffix: &str) -> String {
        format!("{}:{}:{}", self.prefix, self.name, suffix)
    }
}

/// Capability set shared by every queue client, whatever its protocol.
#[async_trait]
pub trait QueueClient: Send + Sync {
    fn identify(&self) -> &QueueIdentity;

    fn is_closed(&self) -> bool;

    async fn job_counts(&self) -> Result<JobCounts, ClientError>;

    /// Releases the handle. A second close fails with `AlreadyClosed`.
    async fn close(&self) -> Result<(), ClientError>;
}

pub struct QueueHandle {
    identity: QueueIdentity,
    store: Arc<dyn QueueStore>,
    closed: AtomicBool,
}

impl QueueHandle {
    pub fn new(identity: QueueIdentity, store: Arc<dyn QueueStore>) -> Self {
        Self {
            identity,
            store,
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl QueueClient for QueueHandle {
    fn identify(&self) -> &QueueIdentity {
        &self.identity
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn job_counts(&self) -> Result<JobCounts, ClientError> {
        if self.is_closed() {
            return Err(ClientError::Closed(self.identity.name.clone()));
        }

        let mut counts = JobCounts::default();
        for &(state, kind) in self.identity.protocol.job_states() {
            let len = self
                .store
                .len(&self.identity.key(state), kind)
                .await
                .map_err(|source| ClientError::Counts {
                    name: self.identity.name.clone(),
                    source,
                })?;
            counts.0.insert(state, len);
        }
        Ok(counts)
    }

    async fn close(&self) -> Result<(), ClientError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyClosed(self.identity.name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyKind, MemoryStore};

    fn identity(protocol: Protocol) -> QueueIdentity {
        QueueIdentity {
            name: "email".into(),
            protocol,
            prefix: "bull".into(),
        }
    }

    #[tokio::test]
    async fn counts_read_protocol_keys() {
        let store = Arc::new(MemoryStore::new());
        store.set_len("bull:email:wait", KeyKind::List, 3).await;
        store.set_len("bull:email:failed", KeyKind::SortedSet, 2).await;
        store.set_len("bull:email:prioritized", KeyKind::SortedSet, 5).await;

        let legacy = QueueHandle::new(identity(Protocol::Legacy), store.clone());
        let counts = legacy.job_counts().await.unwrap();
        assert_eq!(counts.get("wait"), 3);
        assert_eq!(counts.get("failed"), 2);
        assert!(!counts.0.contains_key("prioritized"));
        assert_eq!(counts.total(), 5);

        let modern = QueueHandle::new(identity(Protocol::Modern), store);
        assert_eq!(modern.job_counts().await.unwrap().get("prioritized"), 5);
    }

    #[tokio::test]
    async fn closed_handle_rejects_work() {
        let handle = QueueHandle::new(identity(Protocol::Modern), Arc::new(MemoryStore::new()));
        handle.close().await.unwrap();
        assert!(handle.is_closed());
        assert!(matches!(handle.job_counts().await, Err(ClientError::Closed(_))));
        assert!(matches!(handle.close().await, Err(ClientError::AlreadyClosed(_))));
    }
}
