//! Shared HTTP state

use std::sync::Arc;

use super::session::SessionStore;
use crate::auth::AuthGate;
use crate::config::BoardConfig;
use crate::discovery::AdapterPublisher;

/// Browser-facing paths, already joined with the proxy prefix
#[derive(Debug, Clone)]
pub struct Pages {
    pub base_path: String,
    pub home: String,
    pub login: String,
}

impl Pages {
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            base_path: config.proxy_path.clone(),
            home: config.proxy_home_page(),
            login: config.proxy_login_page(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<AdapterPublisher>,
    pub auth: AuthGate,
    pub sessions: Arc<SessionStore>,
    pub pages: Arc<Pages>,
}

impl AppState {
    pub fn new(config: &BoardConfig, publisher: Arc<AdapterPublisher>) -> Self {
        Self {
            publisher,
            auth: AuthGate::new(config.credentials()),
            sessions: Arc::new(SessionStore::new()),
            pages: Arc::new(Pages::from_config(config)),
        }
    }
}
