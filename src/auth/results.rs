//! Authentication result types
//!
//! Defines the decision returned by the auth gate.

/// Outcome of checking submitted credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Authorized,
    Denied,
}

impl AuthDecision {
    pub fn is_authorized(self) -> bool {
        matches!(self, AuthDecision::Authorized)
    }
}
