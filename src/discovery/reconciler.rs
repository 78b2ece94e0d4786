//! Reconciler
//!
//! Runs one discovery cycle: scan the store, diff against the registry,
//! create and close clients, then publish a fresh snapshot. At most one cycle
//! runs at a time; a call made while another is in flight is skipped.

use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::Mutex;

use super::publisher::AdapterPublisher;
use super::registry::QueueRegistry;
use super::results::{CycleOutcome, CycleReport, CycleState};
use super::scanner::KeyScanner;
use crate::error::handlers::handle_client_error;
use crate::queue::{Protocol, QueueClient, QueueClientFactory};

pub struct Reconciler {
    scanner: KeyScanner,
    factory: Arc<dyn QueueClientFactory>,
    protocol: Protocol,
    publisher: Arc<AdapterPublisher>,
    registry: Mutex<QueueRegistry>,
    /// Held for the whole cycle
    in_flight: Mutex<()>,
    state: AtomicU8,
}

impl Reconciler {
    pub fn new(
        scanner: KeyScanner,
        factory: Arc<dyn QueueClientFactory>,
        protocol: Protocol,
        publisher: Arc<AdapterPublisher>,
    ) -> Self {
        Self {
            scanner,
            factory,
            protocol,
            publisher,
            registry: Mutex::new(QueueRegistry::new()),
            in_flight: Mutex::new(()),
            state: AtomicU8::new(CycleState::Idle as u8),
        }
    }

    pub fn state(&self) -> CycleState {
        CycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn enter(&self, state: CycleState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Names currently tracked, in ascending order
    pub async fn tracked_queues(&self) -> Vec<String> {
        self.registry.lock().await.names()
    }

    /// Runs a cycle unless one is already in flight.
    pub async fn reconcile(&self) -> CycleOutcome {
        let Ok(_flight) = self.in_flight.try_lock() else {
            debug!("Queue update already running, skipping");
            return CycleOutcome::Skipped;
        };

        let outcome = self.run_cycle().await;
        self.enter(CycleState::Idle);
        outcome
    }

    async fn run_cycle(&self) -> CycleOutcome {
        self.enter(CycleState::Scanning);
        let scanned = match self.scanner.scan().await {
            Ok(names) => names,
            Err(failure) => {
                error!("Error updating queues: {}", failure);
                return CycleOutcome::ScanFailed(failure);
            }
        };

        self.enter(CycleState::Diffing);
        let diff = self.registry.lock().await.diff(&scanned);

        self.enter(CycleState::Applying);
        let mut report = CycleReport::default();
        {
            let mut registry = self.registry.lock().await;

            for name in diff.to_add {
                match self.factory.create(&name, self.protocol).await {
                    Ok(client) => {
                        if registry.insert(name.clone(), client) {
                            info!("Tracking queue {} ({})", name, self.protocol);
                            report.added.push(name);
                        }
                    }
                    Err(e) => {
                        handle_client_error(&e);
                        report.create_failures.push(name);
                    }
                }
            }

            for name in diff.to_remove {
                let Some(client) = registry.remove(&name) else {
                    continue;
                };
                // Dropped from tracking even if close fails
                if let Err(e) = client.close().await {
                    handle_client_error(&e);
                    report.close_failures.push(name.clone());
                }
                info!("Stopped tracking queue {}", name);
                report.removed.push(name);
            }
        }

        self.enter(CycleState::Publishing);
        let adapters = self.registry.lock().await.adapters();
        report.tracked = adapters.len();
        self.publisher.replace_queues(adapters);

        CycleOutcome::Completed(report)
    }

    /// Empties the registry for shutdown, waiting for any running cycle first.
    pub async fn drain(&self) -> Vec<(String, Arc<dyn QueueClient>)> {
        let _flight = self.in_flight.lock().await;
        self.registry.lock().await.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::queue::{JobCounts, QueueIdentity, StoreClientFactory};
    use crate::store::{MemoryStore, QueueStore};
    use async_trait::async_trait;

    fn reconciler(store: Arc<MemoryStore>) -> (Reconciler, Arc<AdapterPublisher>) {
        let store: Arc<dyn QueueStore> = store;
        let publisher = Arc::new(AdapterPublisher::new());
        let reconciler = Reconciler::new(
            KeyScanner::new(Arc::clone(&store), "bull"),
            Arc::new(StoreClientFactory::new(store, "bull")),
            Protocol::Modern,
            Arc::clone(&publisher),
        );
        (reconciler, publisher)
    }

    #[tokio::test]
    async fn first_cycle_tracks_every_queue() {
        let store = Arc::new(MemoryStore::with_keys(["bull:sms:id", "bull:email:id"]).await);
        let (reconciler, publisher) = reconciler(store);

        let outcome = reconciler.reconcile().await;
        let report = outcome.report().unwrap();
        assert_eq!(report.added, vec!["email", "sms"]);
        assert_eq!(report.tracked, 2);
        assert_eq!(reconciler.tracked_queues().await, vec!["email", "sms"]);
        assert_eq!(publisher.queue_names(), vec!["email", "sms"]);
        assert_eq!(reconciler.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn unchanged_store_keeps_existing_clients() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id"]).await);
        let (reconciler, publisher) = reconciler(store);

        reconciler.reconcile().await;
        let first = Arc::clone(publisher.snapshot()[0].client());

        let outcome = reconciler.reconcile().await;
        let report = outcome.report().unwrap();
        assert!(report.added.is_empty());
        assert!(report.removed.is_empty());

        let second = Arc::clone(publisher.snapshot()[0].client());
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!second.is_closed());
    }

    #[tokio::test]
    async fn vanished_queue_is_closed_and_dropped() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id", "bull:sms:id"]).await);
        let (reconciler, publisher) = reconciler(Arc::clone(&store));
        reconciler.reconcile().await;
        let sms = Arc::clone(publisher.snapshot()[1].client());

        store.remove_key("bull:sms:id").await;
        let outcome = reconciler.reconcile().await;

        assert_eq!(outcome.report().unwrap().removed, vec!["sms"]);
        assert!(sms.is_closed());
        assert_eq!(publisher.queue_names(), vec!["email"]);
    }

    #[tokio::test]
    async fn scan_failure_leaves_registry_alone() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id"]).await);
        let (reconciler, publisher) = reconciler(Arc::clone(&store));
        reconciler.reconcile().await;

        store.remove_key("bull:email:id").await;
        store.fail_scans(true);
        let outcome = reconciler.reconcile().await;

        assert!(matches!(outcome, CycleOutcome::ScanFailed(_)));
        assert_eq!(reconciler.tracked_queues().await, vec!["email"]);
        assert_eq!(publisher.queue_names(), vec!["email"]);
        assert_eq!(reconciler.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn create_failure_is_retried_next_cycle() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id"]).await);
        let (reconciler, publisher) = reconciler(Arc::clone(&store));

        store.fail_pings(true);
        let outcome = reconciler.reconcile().await;
        assert_eq!(outcome.report().unwrap().create_failures, vec!["email"]);
        assert!(publisher.queue_names().is_empty());

        store.fail_pings(false);
        let outcome = reconciler.reconcile().await;
        assert_eq!(outcome.report().unwrap().added, vec!["email"]);
    }

    #[tokio::test]
    async fn empty_scan_clears_everything() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id", "bull:sms:id"]).await);
        let (reconciler, publisher) = reconciler(Arc::clone(&store));
        reconciler.reconcile().await;

        store.remove_key("bull:email:id").await;
        store.remove_key("bull:sms:id").await;
        let outcome = reconciler.reconcile().await;

        assert_eq!(outcome.report().unwrap().removed, vec!["email", "sms"]);
        assert!(reconciler.tracked_queues().await.is_empty());
        assert!(publisher.snapshot().is_empty());
    }

    #[tokio::test]
    async fn drain_empties_registry() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id"]).await);
        let (reconciler, _publisher) = reconciler(store);
        reconciler.reconcile().await;

        let drained = reconciler.drain().await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].0, "email");
        assert!(reconciler.tracked_queues().await.is_empty());
    }

    /// Client whose close always fails
    struct StuckClient(Arc<dyn QueueClient>);

    #[async_trait]
    impl QueueClient for StuckClient {
        fn identify(&self) -> &QueueIdentity {
            self.0.identify()
        }

        fn is_closed(&self) -> bool {
            self.0.is_closed()
        }

        async fn job_counts(&self) -> Result<JobCounts, ClientError> {
            self.0.job_counts().await
        }

        async fn close(&self) -> Result<(), ClientError> {
            Err(ClientError::AlreadyClosed(self.identify().name.clone()))
        }
    }

    struct StuckFactory(StoreClientFactory);

    #[async_trait]
    impl QueueClientFactory for StuckFactory {
        async fn create(
            &self,
            name: &str,
            protocol: Protocol,
        ) -> Result<Arc<dyn QueueClient>, ClientError> {
            let client = self.0.create(name, protocol).await?;
            Ok(Arc::new(StuckClient(client)))
        }
    }

    #[tokio::test]
    async fn close_failure_still_drops_the_queue() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id", "bull:sms:id"]).await);
        let shared: Arc<dyn QueueStore> = store.clone();
        let publisher = Arc::new(AdapterPublisher::new());
        let reconciler = Reconciler::new(
            KeyScanner::new(Arc::clone(&shared), "bull"),
            Arc::new(StuckFactory(StoreClientFactory::new(shared, "bull"))),
            Protocol::Modern,
            Arc::clone(&publisher),
        );
        reconciler.reconcile().await;

        store.remove_key("bull:sms:id").await;
        let outcome = reconciler.reconcile().await;
        let report = outcome.report().unwrap();

        assert_eq!(report.removed, vec!["sms"]);
        assert_eq!(report.close_failures, vec!["sms"]);
        assert_eq!(reconciler.tracked_queues().await, vec!["email"]);
        assert_eq!(publisher.queue_names(), vec!["email"]);
    }
}
