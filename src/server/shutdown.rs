//! Graceful shutdown
//!
//! Stops the scheduler, closes every tracked client one at a time, then
//! releases the store connection.

use log::{error, info, warn};
use std::sync::Arc;

use super::scheduler::Scheduler;
use crate::discovery::{AdapterPublisher, Reconciler};
use crate::error::handlers::handle_client_error;
use crate::store::QueueStore;

/// What the drain managed to release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub closed: Vec<String>,
    pub failed: Vec<String>,
    pub store_disconnected: bool,
}

pub struct ShutdownCoordinator {
    scheduler: Option<Scheduler>,
    reconciler: Arc<Reconciler>,
    publisher: Arc<AdapterPublisher>,
    store: Arc<dyn QueueStore>,
}

impl ShutdownCoordinator {
    pub fn new(
        scheduler: Option<Scheduler>,
        reconciler: Arc<Reconciler>,
        publisher: Arc<AdapterPublisher>,
        store: Arc<dyn QueueStore>,
    ) -> Self {
        Self {
            scheduler,
            reconciler,
            publisher,
            store,
        }
    }

    pub async fn run(self) -> ShutdownReport {
        info!("shutting down...");
        // Must happen first so no cycle recreates a client mid-teardown
        if let Some(scheduler) = self.scheduler {
            scheduler.stop().await;
        }

        info!("closing queues...");
        let mut report = ShutdownReport::default();
        for (name, client) in self.reconciler.drain().await {
            self.publisher.remove_queue(&name);
            match client.close().await {
                Ok(()) => report.closed.push(name),
                Err(e) => {
                    handle_client_error(&e);
                    report.failed.push(name);
                }
            }
        }

        info!("closing redis...");
        match self.store.disconnect().await {
            Ok(()) => report.store_disconnected = true,
            Err(e) => warn!("Failed to disconnect store: {}", e),
        }

        info!("bye");
        report
    }
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}
