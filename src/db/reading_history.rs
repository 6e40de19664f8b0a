use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{HistoryEntry, ReadingHistoryEntry},
};

use super::error::DatabaseError;

#[tracing::instrument(name = "get reading history", skip_all, fields(user_id = %user_id))]
pub async fn get_reading_history(
    pool: &PgPool,
    user_id: Uuid,
    limit: Option<i64>,
) -> Result<Vec<ReadingHistoryEntry>, Error> {
    let entries = sqlx::query_as::<_, ReadingHistoryEntry>(
        r#"
        SELECT *
        FROM
            reading_history
        WHERE
            user_id = $1
        ORDER BY last_read DESC
        LIMIT $2
    "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(entries)
}

/// One entry per (user, novel): a repeat visit moves the position and refreshes `last_read`.
#[tracing::instrument(name = "upsert reading history", skip_all, fields(user_id = %user_id, novel_id = %entry.novel_id))]
pub async fn upsert_reading_history(
    pool: &PgPool,
    user_id: Uuid,
    entry: HistoryEntry,
) -> Result<ReadingHistoryEntry, Error> {
    let entry = sqlx::query_as::<_, ReadingHistoryEntry>(
        r#"
        INSERT INTO reading_history
            (id, user_id, novel_id, chapter_id, chapter_title, novel_title, novel_cover, last_read)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, NOW())
        ON CONFLICT (user_id, novel_id) DO UPDATE
        SET
            chapter_id = EXCLUDED.chapter_id,
            chapter_title = EXCLUDED.chapter_title,
            novel_title = EXCLUDED.novel_title,
            novel_cover = EXCLUDED.novel_cover,
            last_read = EXCLUDED.last_read
        RETURNING *;
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(entry.novel_id)
    .bind(entry.chapter_id)
    .bind(entry.chapter_title)
    .bind(entry.novel_title)
    .bind(entry.novel_cover)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(entry)
}

#[tracing::instrument(name = "remove novel from reading history", skip_all, fields(user_id = %user_id, novel_id = %novel_id))]
pub async fn remove_from_history(
    pool: &PgPool,
    user_id: Uuid,
    novel_id: Uuid,
) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM reading_history WHERE user_id = $1 AND novel_id = $2;")
        .bind(user_id)
        .bind(novel_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}

#[tracing::instrument(name = "clear reading history", skip_all, fields(user_id = %user_id))]
pub async fn clear_history(pool: &PgPool, user_id: Uuid) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM reading_history WHERE user_id = $1;")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}
