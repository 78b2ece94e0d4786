//! Discovery result types
//!
//! Defines what a reconciliation cycle reports back.

use crate::error::ScanFailure;

/// Phase the reconciler is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CycleState {
    Idle = 0,
    Scanning = 1,
    Diffing = 2,
    Applying = 3,
    Publishing = 4,
}

impl CycleState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CycleState::Scanning,
            2 => CycleState::Diffing,
            3 => CycleState::Applying,
            4 => CycleState::Publishing,
            _ => CycleState::Idle,
        }
    }
}

/// Names to create and names to drop after a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryDiff {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

impl RegistryDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Changes applied by a completed cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Not tracked this cycle; retried on the next one
    pub create_failures: Vec<String>,
    /// Removed from tracking although close failed
    pub close_failures: Vec<String>,
    /// Size of the published snapshot
    pub tracked: usize,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Registry left untouched
    ScanFailed(ScanFailure),
    /// Another cycle was already running
    Skipped,
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CycleOutcome::Skipped)
    }
}
