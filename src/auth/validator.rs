//! Authentication gate
//!
//! Pure credential check consulted before dashboard routes. Session issuance
//! lives in the HTTP layer.

use super::credentials::Credentials;
use super::results::AuthDecision;

/// Stateless predicate over the configured credentials.
///
/// With no credentials configured the gate is disabled and every request is
/// authorized.
#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    expected: Option<Credentials>,
}

impl AuthGate {
    pub fn new(expected: Option<Credentials>) -> Self {
        Self { expected }
    }

    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    /// Checks a submitted username/password pair.
    pub fn check(&self, username: &str, password: &str) -> AuthDecision {
        match &self.expected {
            None => AuthDecision::Authorized,
            Some(expected) if expected.matches(username, password) => AuthDecision::Authorized,
            Some(_) => AuthDecision::Denied,
        }
    }
}
