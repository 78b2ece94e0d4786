//! Server core functionality
//!
//! HTTP surface, periodic discovery and the shutdown sequence.

pub mod core;
pub mod handlers;
pub mod routes;
pub mod scheduler;
pub mod session;
pub mod shutdown;
pub mod state;

pub use self::core::Server;
pub use routes::build_router;
pub use scheduler::Scheduler;
pub use shutdown::{ShutdownCoordinator, ShutdownReport, shutdown_signal};
pub use state::AppState;
