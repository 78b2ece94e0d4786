//! Request handlers
//!
//! Dashboard pages over the published snapshot, plus the login form.

use axum::Form;
use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::session::session_cookie;
use super::state::AppState;
use crate::auth::AuthDecision;
use crate::error::handlers::error_to_status;
use crate::queue::JobCounts;

#[derive(Debug, Serialize)]
pub struct QueueSummary {
    pub name: String,
    pub protocol: &'static str,
    /// `None` when the counts could not be read
    pub counts: Option<JobCounts>,
}

#[derive(Debug, Serialize)]
pub struct QueuesResponse {
    pub queues: Vec<QueueSummary>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// 302 to `location`
pub fn redirect_to(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// GET /
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.publisher.snapshot();
    let base = &state.pages.base_path;

    let mut rows = String::new();
    for adapter in snapshot.iter() {
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(adapter.name()),
            adapter.protocol()
        );
    }
    if snapshot.is_empty() {
        rows.push_str("<tr><td colspan=\"2\">No queues found</td></tr>\n");
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Bull Board</title></head>
<body>
<h1>Bull Board</h1>
<p>{count} queue(s) &middot; <a href="{base}/api/queues">JSON</a></p>
<table>
<thead><tr><th>Queue</th><th>Type</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        count = snapshot.len(),
        base = escape_html(base),
    ))
}

/// GET /api/queues
pub async fn list_queues(State(state): State<AppState>) -> Json<QueuesResponse> {
    let snapshot = state.publisher.snapshot();

    let mut queues = Vec::with_capacity(snapshot.len());
    for adapter in snapshot.iter() {
        let counts = match adapter.client().job_counts().await {
            Ok(counts) => Some(counts),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        queues.push(QueueSummary {
            name: adapter.name().to_string(),
            protocol: adapter.protocol().as_str(),
            counts,
        });
    }

    Json(QueuesResponse { queues })
}

/// GET /api/queues/{name}
pub async fn queue_counts(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(adapter) = state.publisher.find(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match adapter.client().job_counts().await {
        Ok(counts) => Json(QueueSummary {
            name: adapter.name().to_string(),
            protocol: adapter.protocol().as_str(),
            counts: Some(counts),
        })
        .into_response(),
        Err(e) => {
            warn!("{}", e);
            (error_to_status(&e), e.to_string()).into_response()
        }
    }
}

/// GET /login
pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Bull Board Login</title></head>
<body>
<h1>Bull Board</h1>
<form method="post" action="{action}">
  <label for="username">Username:</label>
  <input type="text" id="username" name="username" required>
  <label for="password">Password:</label>
  <input type="password" id="password" name="password" required>
  <button type="submit">Login</button>
</form>
</body>
</html>
"#,
        action = escape_html(&state.pages.login),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    // Incomplete submissions fail like wrong credentials
    let Ok(Form(form)) = form else {
        warn!("Rejected malformed login submission");
        return redirect_to(&state.pages.login);
    };

    match state.auth.check(&form.username, &form.password) {
        AuthDecision::Authorized => {
            let id = state.sessions.create().await;
            let mut response = redirect_to(&state.pages.home);
            if let Ok(cookie) = HeaderValue::from_str(&session_cookie(&id)) {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            response
        }
        AuthDecision::Denied => {
            warn!("Rejected login attempt for user {:?}", form.username);
            redirect_to(&state.pages.login)
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
