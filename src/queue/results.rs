//! Queue client result types
//!
//! Defines result structures returned by queue client operations.

use serde::Serialize;
use std::collections::BTreeMap;

/// Job count per state name, e.g. `"wait" -> 3`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct JobCounts(pub BTreeMap<&'static str, u64>);

impl JobCounts {
    pub fn get(&self, state: &str) -> u64 {
        self.0.get(state).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}
