//! Queue registry
//!
//! Tracks the live client for every queue currently known to exist. Only the
//! reconciler mutates it.

use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::publisher::QueueAdapter;
use super::results::RegistryDiff;
use crate::queue::QueueClient;

/// Registry mapping queue names to their open client
#[derive(Default)]
pub struct QueueRegistry {
    queues: BTreeMap<String, Arc<dyn QueueClient>>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a client for a new queue. An already tracked name keeps its
    /// existing client and `false` is returned.
    pub fn insert(&mut self, name: String, client: Arc<dyn QueueClient>) -> bool {
        if self.contains(&name) {
            warn!("Queue {name} is already tracked");
            return false;
        }
        self.queues.insert(name, client);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn QueueClient>> {
        self.queues.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.queues.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Tracked names in ascending order
    pub fn names(&self) -> Vec<String> {
        self.queues.keys().cloned().collect()
    }

    /// Compares the tracked names against a fresh scan.
    pub fn diff(&self, scanned: &[String]) -> RegistryDiff {
        let to_add = scanned
            .iter()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect();
        let to_remove = self
            .queues
            .keys()
            .filter(|name| !scanned.contains(name))
            .cloned()
            .collect();
        RegistryDiff { to_add, to_remove }
    }

    /// One adapter per entry, ordered by queue name
    pub fn adapters(&self) -> Vec<QueueAdapter> {
        self.queues
            .values()
            .map(|client| QueueAdapter::new(Arc::clone(client)))
            .collect()
    }

    /// Empties the registry, returning entries in name order.
    pub fn drain(&mut self) -> Vec<(String, Arc<dyn QueueClient>)> {
        std::mem::take(&mut self.queues).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{Protocol, QueueHandle, QueueIdentity};
    use crate::store::MemoryStore;

    fn client(name: &str) -> Arc<dyn QueueClient> {
        let identity = QueueIdentity {
            name: name.into(),
            protocol: Protocol::Modern,
            prefix: "bull".into(),
        };
        Arc::new(QueueHandle::new(identity, Arc::new(MemoryStore::new())))
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_splits_new_and_vanished_names() {
        let mut registry = QueueRegistry::new();
        assert!(registry.insert("email".into(), client("email")));
        assert!(registry.insert("sms".into(), client("sms")));

        let diff = registry.diff(&names(&["email", "push"]));
        assert_eq!(diff.to_add, names(&["push"]));
        assert_eq!(diff.to_remove, names(&["sms"]));

        let diff = registry.diff(&names(&["email", "sms"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut registry = QueueRegistry::new();
        assert!(registry.insert("email".into(), client("email")));
        assert!(!registry.insert("email".into(), client("email")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn adapters_and_drain_follow_name_order() {
        let mut registry = QueueRegistry::new();
        for name in ["sms", "email", "push"] {
            assert!(registry.insert(name.into(), client(name)));
        }

        let adapters: Vec<_> = registry.adapters().iter().map(|a| a.name().to_string()).collect();
        assert_eq!(adapters, names(&["email", "push", "sms"]));

        let drained: Vec<_> = registry.drain().into_iter().map(|(name, _)| name).collect();
        assert_eq!(drained, names(&["email", "push", "sms"]));
        assert!(registry.is_empty());
    }
}
