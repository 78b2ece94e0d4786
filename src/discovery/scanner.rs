//! Key scanner
//!
//! Finds queue names by listing `<prefix>:*:id` keys. Every queue library
//! version keeps an id counter under that key, so its presence means the
//! queue exists.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use crate::error::ScanFailure;
use crate::store::QueueStore;

/// Prefix stand-in used before matching; it must not contain ':'
const PREFIX_PLACEHOLDER: &str = "bull";

static QUEUE_ID_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+?:(.+?):id$").expect("queue id key pattern is valid"));

pub struct KeyScanner {
    store: Arc<dyn QueueStore>,
    prefix: String,
}

impl KeyScanner {
    pub fn new(store: Arc<dyn QueueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Glob handed to KEYS
    pub fn pattern(&self) -> String {
        format!("{}:*:id", self.prefix)
    }

    /// Returns the sorted, de-duplicated queue names currently in the store.
    ///
    /// A failed query fails the whole scan; no partial list is returned.
    pub async fn scan(&self) -> Result<Vec<String>, ScanFailure> {
        let pattern = self.pattern();
        let keys = self
            .store
            .keys(&pattern)
            .await
            .map_err(|source| ScanFailure { pattern, source })?;
        Ok(self.queue_names(&keys))
    }

    pub fn queue_names(&self, keys: &[String]) -> Vec<String> {
        keys.iter()
            .map(|key| extract_queue_name(&self.prefix, key))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Pulls the queue name out of an id key.
///
/// The prefix may itself contain ':', so its first occurrence is swapped for
/// a colon-free placeholder before matching `^.+?:(.+?):id$`. A key that does
/// not match (only `<prefix>::id` can) is kept as-is after the swap, the way
/// the queue library's own dashboards name it.
pub fn extract_queue_name(prefix: &str, key: &str) -> String {
    let key = key.replacen(prefix, PREFIX_PLACEHOLDER, 1);
    match QUEUE_ID_KEY.captures(&key).and_then(|captures| captures.get(1)) {
        Some(name) => name.as_str().to_string(),
        None => key,
    }
}
