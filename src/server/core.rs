//! Server lifecycle
//!
//! Wires the store, discovery loop and HTTP router together, serves until a
//! termination signal arrives, then drains.

use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::routes::build_router;
use super::scheduler::Scheduler;
use super::shutdown::{ShutdownCoordinator, ShutdownReport, shutdown_signal};
use super::state::AppState;
use crate::config::{BoardConfig, HOME_PAGE};
use crate::discovery::{AdapterPublisher, KeyScanner, Reconciler};
use crate::error::BoardError;
use crate::queue::StoreClientFactory;
use crate::store::{QueueStore, RedisStore};

pub struct Server {
    config: BoardConfig,
    store: Arc<dyn QueueStore>,
    publisher: Arc<AdapterPublisher>,
    reconciler: Arc<Reconciler>,
}

impl Server {
    /// Connects to the configured Redis deployment.
    pub async fn new(config: BoardConfig) -> Result<Self, BoardError> {
        let store = Arc::new(RedisStore::connect(&config).await?);
        Ok(Self::with_store(config, store))
    }

    /// Builds the server over an already connected store.
    pub fn with_store(config: BoardConfig, store: Arc<dyn QueueStore>) -> Self {
        let publisher = Arc::new(AdapterPublisher::new());
        let reconciler = Arc::new(Reconciler::new(
            KeyScanner::new(Arc::clone(&store), config.bull_prefix.clone()),
            Arc::new(StoreClientFactory::new(
                Arc::clone(&store),
                config.bull_prefix.clone(),
            )),
            config.bull_version,
            Arc::clone(&publisher),
        ));

        Self {
            config,
            store,
            publisher,
            reconciler,
        }
    }

    /// Serves until SIGINT/SIGTERM, then runs the shutdown sequence.
    pub async fn start(self) -> Result<ShutdownReport, BoardError> {
        let addr = self.config.listen_socket();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| BoardError::Bind {
                addr: addr.clone(),
                source,
            })?;

        info!(
            "queue-board is started http://localhost:{}{}",
            self.config.port, HOME_PAGE
        );
        info!("queue-board is fetching queue list, please wait...");

        // First render should not wait a whole period
        self.reconciler.reconcile().await;
        let scheduler = Scheduler::start(
            Arc::clone(&self.reconciler),
            self.config.refresh_interval(),
        );

        // Ticks stop at the signal, before in-flight requests finish draining
        let ticks = scheduler.cancellation_token();
        let app = build_router(AppState::new(&self.config, Arc::clone(&self.publisher)));
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                ticks.cancel();
            })
            .await;

        let report = ShutdownCoordinator::new(
            Some(scheduler),
            self.reconciler,
            self.publisher,
            self.store,
        )
        .run()
        .await;

        served.map_err(BoardError::Serve)?;
        Ok(report)
    }
}
