use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::ValidationErrors;

use crate::{auth::error::AuthError, chatbot::ChatbotError, db::error::DatabaseError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error")]
    Database(DatabaseError),

    #[error("Auth error")]
    Auth(AuthError),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Chatbot error")]
    Chatbot(ChatbotError),

    #[error("Other error: {0}")]
    Other(anyhow::Error),
}

impl From<DatabaseError> for Error {
    fn from(value: DatabaseError) -> Self {
        Self::Database(value)
    }
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<ChatbotError> for Error {
    fn from(value: ChatbotError) -> Self {
        Self::Chatbot(value)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Joins the messages of every failed field, sorted so the output is stable.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .map(|error| match &error.message {
            Some(message) => message.to_string(),
            None => error.code.to_string(),
        })
        .collect();
    messages.sort();

    messages.join(", ")
}

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "message": message.into() }))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Database(database_error) => match database_error {
                DatabaseError::DatabaseError(error) => {
                    tracing::error!(err.msg = %error, err.details=?error, "Database Error");

                    message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }
                DatabaseError::NotFound(_) => {
                    message_response(StatusCode::NOT_FOUND, database_error.to_string())
                }
                DatabaseError::Conflict(message) => {
                    message_response(StatusCode::CONFLICT, message)
                }
            },
            Error::Auth(auth_error) => match auth_error {
                AuthError::JwtError(error) => {
                    tracing::error!(err.msg = %error, err.details=?error, "JWT Error");

                    message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }
                AuthError::PasswordError(error) => {
                    tracing::error!(err.msg = %error, err.details=?error, "Password Hash Error");

                    message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }
                AuthError::OAuth(error) => {
                    tracing::warn!(err.msg = %error, err.details=?error, "OAuth Error");

                    message_response(StatusCode::UNAUTHORIZED, "Google authentication failed")
                }
                AuthError::Unauthenticated
                | AuthError::InvalidToken
                | AuthError::IncorrectCredential(_) => {
                    message_response(StatusCode::UNAUTHORIZED, auth_error.to_string())
                }
                AuthError::Inactive | AuthError::Forbidden => {
                    message_response(StatusCode::FORBIDDEN, auth_error.to_string())
                }
                AuthError::ProviderNotConfigured => {
                    message_response(StatusCode::NOT_FOUND, auth_error.to_string())
                }
            },
            Error::Validation(validation_error) => {
                tracing::warn!(err.msg = %validation_error, "Validation Error");

                message_response(
                    StatusCode::BAD_REQUEST,
                    validation_message(&validation_error),
                )
            }
            Error::BadRequest(message) => message_response(StatusCode::BAD_REQUEST, message),
            Error::Rejected { status, message } => message_response(status, message),
            Error::Chatbot(error) => {
                tracing::error!(err.msg = %error, err.details=?error, "Chatbot Error");

                message_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to process chat: {}", error),
                )
            }
            Error::Other(error) => {
                tracing::error!(err.msg = %error, err.details=?error, "Other Error");

                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}
