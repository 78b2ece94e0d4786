//! Login middleware
//!
//! Redirects requests without an authenticated session to the login page.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::server::handlers::redirect_to;
use crate::server::state::AppState;

pub async fn require_login(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.sessions.is_authenticated_request(request.headers()).await {
        next.run(request).await
    } else {
        redirect_to(&state.pages.login)
    }
}
