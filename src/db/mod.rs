pub mod chapter;
pub mod comment;
pub mod error;
pub mod genre;
pub mod novel;
pub mod reading_history;
pub mod stats;
pub mod user;

pub type PostgresTransaction = sqlx::Transaction<'static, sqlx::Postgres>;
