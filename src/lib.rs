pub mod auth;
pub mod config;
pub mod discovery;
pub mod error;
pub mod middleware;
pub mod queue;
pub mod server;
pub mod store;
pub mod utils;

pub use server::Server;
