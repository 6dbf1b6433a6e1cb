use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::models::status::ApplicationStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {0}")]
    InvalidPayload(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Concurrent update: status is now {current}")]
    ConcurrencyConflict { current: ApplicationStatus },

    #[error("Application is {status} and can no longer be deleted")]
    TerminalRecord { status: ApplicationStatus },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(sqlx::Error),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Validation(_) | Error::InvalidPayload(_) => "validation_error",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::NotFound(_) => "not_found",
            Error::IllegalTransition { .. } => "illegal_transition",
            Error::ConcurrencyConflict { .. } => "concurrency_conflict",
            Error::TerminalRecord { .. } => "terminal_record",
            Error::StoreUnavailable(_) | Error::Migrate(_) => "store_unavailable",
            Error::CorruptRecord(_) => "internal",
        }
    }

    /// Last status the store reported for the record involved, if known.
    pub fn current_status(&self) -> Option<ApplicationStatus> {
        match self {
            Error::IllegalTransition { from, .. } => Some(*from),
            Error::ConcurrencyConflict { current } => Some(*current),
            Error::TerminalRecord { status } => Some(*status),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::IllegalTransition { .. }
            | Error::ConcurrencyConflict { .. }
            | Error::TerminalRecord { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_message = match &self {
            Error::StoreUnavailable(err) => {
                tracing::error!(error = %err, "store failure");
                "Storage is temporarily unavailable".to_string()
            }
            Error::CorruptRecord(_) | Error::Config(_) | Error::Migrate(_) => {
                tracing::error!(error = %self, "unexpected failure");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({ "error": error_message, "kind": self.kind() });
        if let Some(current) = self.current_status() {
            body["current_status"] = json!(current);
        }
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::StoreUnavailable(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value as JsonValue;

    #[test]
    fn maps_taxonomy_to_http_status() {
        assert_eq!(Error::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::IllegalTransition {
                from: ApplicationStatus::Rejected,
                to: ApplicationStatus::Completed
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::ConcurrencyConflict { current: ApplicationStatus::Approved }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::StoreUnavailable(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(matches!(Error::from(sqlx::Error::RowNotFound), Error::NotFound(_)));
        assert!(matches!(
            Error::from(sqlx::Error::PoolClosed),
            Error::StoreUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn conflict_body_reports_current_status() {
        let resp = Error::IllegalTransition {
            from: ApplicationStatus::Rejected,
            to: ApplicationStatus::Completed,
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "illegal_transition");
        assert_eq!(body["current_status"], "Rejected");
    }
}
