//! Periodic reconciliation
//!
//! Ticks on a fixed period and runs one cycle per tick. Ticks that come due
//! while a cycle is still running are dropped, not queued.

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::discovery::{CycleOutcome, Reconciler};

pub struct Scheduler {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Spawns the tick loop. The first tick fires one period from now.
    pub fn start(reconciler: Arc<Reconciler>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            info!("Refreshing queue list every {} seconds", period.as_secs());

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                if let CycleOutcome::Skipped = reconciler.reconcile().await {
                    debug!("Tick skipped, previous cycle still running");
                }
            }

            debug!("Scheduler stopped");
        });

        Self { cancel, handle }
    }

    /// Token that ends the tick loop when cancelled, without waiting for it
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stops ticking. A cycle already running is allowed to finish; no tick
    /// fires after this returns.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!("Scheduler task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{AdapterPublisher, KeyScanner};
    use crate::queue::{Protocol, StoreClientFactory};
    use crate::store::{MemoryStore, QueueStore};

    fn reconciler(store: Arc<MemoryStore>) -> Arc<Reconciler> {
        let store: Arc<dyn QueueStore> = store;
        Arc::new(Reconciler::new(
            KeyScanner::new(Arc::clone(&store), "bull"),
            Arc::new(StoreClientFactory::new(store, "bull")),
            Protocol::Modern,
            Arc::new(AdapterPublisher::new()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_period_until_stopped() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id"]).await);
        let scheduler = Scheduler::start(reconciler(Arc::clone(&store)), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.scan_count(), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(store.scan_count(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.scan_count(), 2);

        scheduler.stop().await;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(store.scan_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_ends_ticking() {
        let store = Arc::new(MemoryStore::with_keys(["bull:email:id"]).await);
        let scheduler = Scheduler::start(reconciler(Arc::clone(&store)), Duration::from_secs(60));

        scheduler.cancellation_token().cancel();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(store.scan_count(), 0);

        scheduler.stop().await;
    }
}
