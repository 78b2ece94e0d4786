//! Error types
//!
//! Defines domain-specific error types for each module of the dashboard.

use std::io;

use thiserror::Error;

/// Backing store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("store connection is closed")]
    Disconnected,

    /// Raised by the in-memory store when a failure has been injected.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The KEYS query for queue discovery failed as a whole.
#[derive(Debug, Error)]
#[error("queue scan failed for pattern {pattern}: {source}")]
pub struct ScanFailure {
    pub pattern: String,
    #[source]
    pub source: StoreError,
}

/// Queue client lifecycle errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to create client for queue {name}: {source}")]
    Create {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("client for queue {0} is already closed")]
    AlreadyClosed(String),

    #[error("client for queue {0} is closed")]
    Closed(String),

    #[error("failed to read job counts for queue {name}: {source}")]
    Counts {
        name: String,
        #[source]
        source: StoreError,
    },
}

/// Unrecoverable startup and serving failures
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
