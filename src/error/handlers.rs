//! Error handlers
//!
//! Provides error reporting for fatal and non-fatal errors, and the HTTP
//! status a client error surfaces as.

use axum::http::StatusCode;
use log::{error, warn};

use crate::error::types::{BoardError, ClientError, StoreError};

/// Log an unrecoverable startup or serving error
pub fn handle_error(err: &BoardError) {
    error!("queue-board error: {}", err);
}

/// Log a client error raised during reconciliation or shutdown; never fatal
pub fn handle_client_error(err: &ClientError) {
    warn!("{}", err);
}

/// Maps a client error to the HTTP status returned to the browser
pub fn error_to_status(err: &ClientError) -> StatusCode {
    match err {
        // The queue vanished between the snapshot read and the request
        ClientError::Closed(_) | ClientError::AlreadyClosed(_) => StatusCode::NOT_FOUND,
        ClientError::Create { source, .. } | ClientError::Counts { source, .. } => match source {
            StoreError::Redis(_) => StatusCode::BAD_GATEWAY,
            StoreError::Disconnected | StoreError::Unavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_messages_name_the_queue() {
        let err = ClientError::Counts {
            name: "email".into(),
            source: StoreError::Disconnected,
        };
        assert_eq!(
            err.to_string(),
            "failed to read job counts for queue email: store connection is closed"
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            error_to_status(&ClientError::Closed("email".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_to_status(&ClientError::Counts {
                name: "email".into(),
                source: StoreError::Disconnected,
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            error_to_status(&ClientError::Create {
                name: "sms".into(),
                source: StoreError::Unavailable("ping failed".into()),
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
