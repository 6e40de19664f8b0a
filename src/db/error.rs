#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("Database error")]
    DatabaseError(sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
}

impl DatabaseError {
    /// Maps unique constraint violations to `Conflict`, anything else stays a database error.
    pub fn unique_violation(error: sqlx::Error, message: &str) -> Self {
        let is_unique_violation = error
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false);

        if is_unique_violation {
            DatabaseError::Conflict(message.to_string())
        } else {
            DatabaseError::DatabaseError(error)
        }
    }
}
