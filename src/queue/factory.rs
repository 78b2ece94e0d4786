//! Queue client factory
//!
//! Resolves the protocol variant once and hands back a uniform client.

use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::client::{QueueClient, QueueHandle, QueueIdentity};
use super::protocol::Protocol;
use crate::error::ClientError;
use crate::store::QueueStore;

#[async_trait]
pub trait QueueClientFactory: Send + Sync {
    async fn create(
        &self,
        name: &str,
        protocol: Protocol,
    ) -> Result<Arc<dyn QueueClient>, ClientError>;
}

/// Builds handles over the shared store connection
pub struct StoreClientFactory {
    store: Arc<dyn QueueStore>,
    prefix: String,
}

impl StoreClientFactory {
    pub fn new(store: Arc<dyn QueueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl QueueClientFactory for StoreClientFactory {
    async fn create(
        &self,
        name: &str,
        protocol: Protocol,
    ) -> Result<Arc<dyn QueueClient>, ClientError> {
        // The handle is only useful if the store answers
        self.store
            .ping()
            .await
            .map_err(|source| ClientError::Create {
                name: name.to_string(),
                source,
            })?;

        debug!("Created {} client for queue {}", protocol, name);

        let identity = QueueIdentity {
            name: name.to_string(),
            protocol,
            prefix: self.prefix.clone(),
        };
        Ok(Arc::new(QueueHandle::new(identity, Arc::clone(&self.store))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn unreachable_store_fails_creation() {
        let store = Arc::new(MemoryStore::new());
        store.fail_pings(true);
        let factory = StoreClientFactory::new(store, "bull");

        let err = factory.create("email", Protocol::Modern).await.err().unwrap();
        assert!(matches!(err, ClientError::Create { ref name, .. } if name == "email"));
    }

    #[tokio::test]
    async fn created_client_is_bound_to_name_and_protocol() {
        let factory = StoreClientFactory::new(Arc::new(MemoryStore::new()), "{app}:bull");
        let client = factory.create("sms", Protocol::Legacy).await.unwrap();

        let identity = client.identify();
        assert_eq!(identity.name, "sms");
        assert_eq!(identity.protocol, Protocol::Legacy);
        assert_eq!(identity.key("wait"), "{app}:bull:sms:wait");
        assert!(!client.is_closed());
    }
}
