//! Adapter publishing
//!
//! Holds the snapshot the dashboard renders. Each publish swaps the whole
//! list, so readers see either the previous snapshot or the new one.

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

use crate::queue::{Protocol, QueueClient};

/// Dashboard view of one tracked queue
#[derive(Clone)]
pub struct QueueAdapter {
    client: Arc<dyn QueueClient>,
}

impl QueueAdapter {
    pub fn new(client: Arc<dyn QueueClient>) -> Self {
        Self { client }
    }

    pub fn name(&self) -> &str {
        &self.client.identify().name
    }

    pub fn protocol(&self) -> Protocol {
        self.client.identify().protocol
    }

    pub fn client(&self) -> &Arc<dyn QueueClient> {
        &self.client
    }
}

impl fmt::Debug for QueueAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueAdapter")
            .field("name", &self.name())
            .field("protocol", &self.protocol())
            .finish()
    }
}

pub type AdapterSnapshot = Arc<Vec<QueueAdapter>>;

pub struct AdapterPublisher {
    current: ArcSwap<Vec<QueueAdapter>>,
}

impl Default for AdapterPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterPublisher {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Replaces the rendered list in one swap.
    pub fn replace_queues(&self, adapters: Vec<QueueAdapter>) {
        self.current.store(Arc::new(adapters));
    }

    /// Drops a single queue from the rendered list.
    pub fn remove_queue(&self, name: &str) {
        self.current.rcu(|current| {
            current
                .iter()
                .filter(|adapter| adapter.name() != name)
                .cloned()
                .collect::<Vec<_>>()
        });
    }

    pub fn snapshot(&self) -> AdapterSnapshot {
        self.current.load_full()
    }

    /// Adapter for `name` in the current snapshot
    pub fn find(&self, name: &str) -> Option<QueueAdapter> {
        self.current
            .load()
            .iter()
            .find(|adapter| adapter.name() == name)
            .cloned()
    }

    pub fn queue_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|adapter| adapter.name().to_string())
            .collect()
    }
}
