//! In-memory store
//!
//! Keeps keys in a sorted map and answers KEYS with Redis glob semantics.
//! Scan and ping failures can be switched on to exercise error paths.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{KeyKind, QueueStore};
use crate::error::StoreError;

#[derive(Debug, Clone, Copy)]
enum Value {
    Plain,
    Collection(KeyKind, u64),
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Value>>,
    fail_scans: AtomicBool,
    fail_pings: AtomicBool,
    disconnected: AtomicBool,
    scans: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with plain keys
    pub async fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for key in keys {
            store.insert_key(key).await;
        }
        store
    }

    pub async fn insert_key(&self, key: impl Into<String>) {
        self.data.write().await.insert(key.into(), Value::Plain);
    }

    pub async fn remove_key(&self, key: &str) {
        self.data.write().await.remove(key);
    }

    /// Sets the length of a list or sorted set key
    pub async fn set_len(&self, key: impl Into<String>, kind: KeyKind, len: u64) {
        self.data
            .write()
            .await
            .insert(key.into(), Value::Collection(kind, len));
    }

    pub fn fail_scans(&self, fail: bool) {
        self.fail_scans.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pings(&self, fail: bool) {
        self.fail_pings.store(fail, Ordering::SeqCst);
    }

    /// Number of KEYS queries served, failed ones included
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    fn ensure_connected(&self) -> Result<(), StoreError> {
        if self.is_disconnected() {
            Err(StoreError::Disconnected)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.ensure_connected()?;
        if self.fail_scans.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("scan failure injected".into()));
        }

        let data = self.data.read().await;
        Ok(data
            .keys()
            .filter(|key| glob_match(pattern.as_bytes(), key.as_bytes()))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_connected()?;
        if self.fail_pings.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("ping failure injected".into()));
        }
        Ok(())
    }

    async fn len(&self, key: &str, kind: KeyKind) -> Result<u64, StoreError> {
        self.ensure_connected()?;
        match self.data.read().await.get(key) {
            None => Ok(0),
            Some(Value::Collection(stored, len)) if *stored == kind => Ok(*len),
            Some(_) => Err(StoreError::Unavailable(format!(
                "WRONGTYPE operation against key {key}"
            ))),
        }
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return Err(StoreError::Disconnected);
        }
        Ok(())
    }
}

/// Redis glob subset: `*`, `?` and backslash escapes.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            Some(b'?') => {
                p += 1;
                t += 1;
                continue;
            }
            Some(b'\\') if pattern.get(p + 1) == Some(&text[t]) => {
                p += 2;
                t += 1;
                continue;
            }
            Some(&c) if c != b'\\' && c == text[t] => {
                p += 1;
                t += 1;
                continue;
            }
            _ => {}
        }

        match backtrack {
            Some((star, matched)) => {
                p = star + 1;
                t = matched + 1;
                backtrack = Some((star, matched + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_queue_id_keys() {
        let pattern = b"bull:*:id";
        assert!(glob_match(pattern, b"bull:email:id"));
        assert!(glob_match(pattern, b"bull:a:b:id"));
        assert!(glob_match(pattern, b"bull::id"));
        assert!(!glob_match(pattern, b"bull:email:wait"));
        assert!(!glob_match(pattern, b"other:email:id"));
        assert!(!glob_match(pattern, b"bull:email:idx"));
    }

    #[test]
    fn glob_handles_question_mark_and_escapes() {
        assert!(glob_match(b"q?", b"q1"));
        assert!(!glob_match(b"q?", b"q"));
        assert!(glob_match(br"a\*b", b"a*b"));
        assert!(!glob_match(br"a\*b", b"axb"));
    }

    #[tokio::test]
    async fn injected_scan_failure_is_reported() {
        let store = MemoryStore::with_keys(["bull:email:id"]).await;
        store.fail_scans(true);
        assert!(store.keys("bull:*:id").await.is_err());
        store.fail_scans(false);
        assert_eq!(store.keys("bull:*:id").await.unwrap(), vec!["bull:email:id"]);
        assert_eq!(store.scan_count(), 2);
    }

    #[tokio::test]
    async fn lengths_follow_key_kind() {
        let store = MemoryStore::new();
        store.set_len("bull:email:wait", KeyKind::List, 4).await;
        assert_eq!(store.len("bull:email:wait", KeyKind::List).await.unwrap(), 4);
        assert_eq!(store.len("bull:email:failed", KeyKind::SortedSet).await.unwrap(), 0);
        assert!(store.len("bull:email:wait", KeyKind::SortedSet).await.is_err());
    }

    #[tokio::test]
    async fn disconnect_is_final() {
        let store = MemoryStore::new();
        store.disconnect().await.unwrap();
        assert!(matches!(store.ping().await, Err(StoreError::Disconnected)));
        assert!(store.disconnect().await.is_err());
    }
}
