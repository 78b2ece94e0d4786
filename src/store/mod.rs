//! Backing store access
//!
//! The dashboard only needs a handful of read commands plus lifecycle calls,
//! so the store sits behind a small trait with a Redis and an in-memory
//! implementation.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;

use crate::error::StoreError;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// Redis data type of a job-state key, selecting the length command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// LLEN
    List,
    /// ZCARD
    SortedSet,
}

#[async_trait]
pub trait QueueStore: Send + Sync {
    /// All keys matching a glob pattern. Either the full list or an error.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Length of a list or sorted set; missing keys count as empty.
    async fn len(&self, key: &str, kind: KeyKind) -> Result<u64, StoreError>;

    /// Releases the connection. Every later call fails with `Disconnected`.
    async fn disconnect(&self) -> Result<(), StoreError>;
}
