//! Authentication system
//!
//! Credential holding and the auth decision predicate.

pub mod credentials;
pub mod results;
pub mod validator;

pub use credentials::Credentials;
pub use results::AuthDecision;
pub use validator::AuthGate;
