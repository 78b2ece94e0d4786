//! Queue protocol variants
//!
//! Bull (legacy) and BullMQ (modern) share the `<prefix>:<name>:<state>` key
//! layout but differ in which job states exist.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::store::KeyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Protocol {
    /// Bull
    Legacy,
    /// BullMQ
    Modern,
}

const LEGACY_STATES: &[(&str, KeyKind)] = &[
    ("wait", KeyKind::List),
    ("active", KeyKind::List),
    ("delayed", KeyKind::SortedSet),
    ("completed", KeyKind::SortedSet),
    ("failed", KeyKind::SortedSet),
    ("paused", KeyKind::List),
];

const MODERN_STATES: &[(&str, KeyKind)] = &[
    ("wait", KeyKind::List),
    ("active", KeyKind::List),
    ("delayed", KeyKind::SortedSet),
    ("prioritized", KeyKind::SortedSet),
    ("waiting-children", KeyKind::SortedSet),
    ("completed", KeyKind::SortedSet),
    ("failed", KeyKind::SortedSet),
    ("paused", KeyKind::List),
];

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Legacy => "bull",
            Protocol::Modern => "bullmq",
        }
    }

    /// Job-state key suffixes and their Redis types
    pub fn job_states(self) -> &'static [(&'static str, KeyKind)] {
        match self {
            Protocol::Legacy => LEGACY_STATES,
            Protocol::Modern => MODERN_STATES,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bullmq" | "modern" => Ok(Protocol::Modern),
            "bull" | "legacy" => Ok(Protocol::Legacy),
            other => Err(format!(
                "unknown queue protocol {other:?}, expected BULLMQ or BULL"
            )),
        }
    }
}

impl TryFrom<String> for Protocol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
