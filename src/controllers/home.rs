use axum::http::StatusCode;

use crate::error::Error;

#[tracing::instrument(name = "[GET] home")]
pub async fn index() -> &'static str {
    "Alive"
}

pub async fn not_found() -> Error {
    Error::Rejected {
        status: StatusCode::NOT_FOUND,
        message: "Route not found".to_string(),
    }
}
