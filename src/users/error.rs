use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Field-level rule violations, detected before any store access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    NameEmpty,
    #[error("name must be between 3 and 100 characters")]
    NameLength,
    #[error("email cannot be empty")]
    EmailEmpty,
    #[error("invalid email format")]
    EmailFormat,
    #[error("password cannot be empty")]
    PasswordEmpty,
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
    #[error("invalid role {0:?}: must be 'admin' or 'common'")]
    RoleInvalid(String),
    #[error("at least one field must be provided for update")]
    NoFieldsToUpdate,
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("email already in use: {0}")]
    EmailTaken(String),

    #[error("user {0} not found")]
    NotFound(Uuid),

    #[error("{op} failed for {target}: {source}")]
    Storage {
        op: &'static str,
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{op} timed out for {target}")]
    Timeout { op: &'static str, target: String },

    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn storage(op: &'static str, target: impl ToString, source: sqlx::Error) -> Self {
        UserError::Storage {
            op,
            target: target.to_string(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::EmailTaken(_) => StatusCode::CONFLICT,
            UserError::NotFound(_) => StatusCode::NOT_FOUND,
            UserError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            UserError::Storage { .. } | UserError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            UserError::Validation(_) => "validation_error",
            UserError::EmailTaken(_) => "conflict",
            UserError::NotFound(_) => "not_found",
            UserError::Timeout { .. } => "timeout",
            UserError::Storage { .. } | UserError::PasswordHash(_) => "internal_error",
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() && status != StatusCode::GATEWAY_TIMEOUT {
            tracing::error!(error = %self, "request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "error": {
                    "type": self.kind(),
                    "message": message
                }
            })),
        )
            .into_response()
    }
}
