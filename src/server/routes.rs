//! Router assembly
//!
//! Dashboard routes sit at the home page and are wrapped by the login check
//! when authentication is enabled. The login routes only exist in that case.

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;

use super::handlers;
use super::state::AppState;
use crate::config::LOGIN_PAGE;
use crate::middleware::{log_request, require_login};

pub fn build_router(state: AppState) -> Router {
    let mut dashboard = Router::new()
        .route("/", get(handlers::dashboard))
        .route("/api/queues", get(handlers::list_queues))
        .route("/api/queues/{name}", get(handlers::queue_counts));

    let mut app = Router::new();
    if state.auth.is_enabled() {
        dashboard = dashboard.route_layer(from_fn_with_state(state.clone(), require_login));
        app = app.route(LOGIN_PAGE, get(handlers::login_page).post(handlers::login));
    }

    app.merge(dashboard)
        .layer(from_fn(log_request))
        .with_state(state)
}
