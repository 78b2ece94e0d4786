//! Queue discovery
//!
//! Keeps the set of tracked queue clients in line with the queues present in
//! the store and publishes the result for the dashboard.

pub mod publisher;
pub mod reconciler;
pub mod registry;
pub mod results;
pub mod scanner;

pub use publisher::{AdapterPublisher, AdapterSnapshot, QueueAdapter};
pub use reconciler::Reconciler;
pub use registry::QueueRegistry;
pub use results::{CycleOutcome, CycleReport, CycleState, RegistryDiff};
pub use scanner::{KeyScanner, extract_queue_name};
