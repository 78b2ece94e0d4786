//! Error handling
//!
//! Defines error types and handling for the dashboard.

pub mod handlers;
pub mod types;

pub use types::*;
