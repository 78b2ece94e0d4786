//! Login sessions
//!
//! Minimal in-memory session tracking: a random id in a cookie maps to an
//! authenticated flag. Sessions live until the process exits.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "bull-board.sid";

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashSet<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new authenticated session and returns its id
    pub async fn create(&self) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.sessions.write().await.insert(id.clone());
        id
    }

    pub async fn is_authenticated(&self, id: &str) -> bool {
        self.sessions.read().await.contains(id)
    }

    /// Checks the session cookie carried by a request
    pub async fn is_authenticated_request(&self, headers: &HeaderMap) -> bool {
        match session_id(headers) {
            Some(id) => self.is_authenticated(&id).await,
            None => false,
        }
    }
}

/// Session id from the request's Cookie headers, if any
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, id)| id.to_string())
}

/// Set-Cookie value for a freshly issued session
pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
