//! HTTP middleware
//!
//! Provides request logging and the login check.

pub mod auth;
pub mod logging;

pub use auth::require_login;
pub use logging::log_request;
