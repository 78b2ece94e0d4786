//! Queue clients
//!
//! Protocol variants, client handles and the factory that creates them.

pub mod client;
pub mod factory;
pub mod protocol;
pub mod results;

pub use client::{QueueClient, QueueHandle, QueueIdentity};
pub use factory::{QueueClientFactory, StoreClientFactory};
pub use protocol::Protocol;
pub use results::JobCounts;
