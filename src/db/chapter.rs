use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{Chapter, ChapterChanges, NewChapter},
};

use super::error::DatabaseError;

#[tracing::instrument(name = "get chapters", skip_all)]
pub async fn get_chapters(pool: &PgPool) -> Result<Vec<Chapter>, Error> {
    let chapters = sqlx::query_as::<_, Chapter>(
        r#"
        SELECT *
        FROM
            chapters
        ORDER BY novel_id, chapter_number
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(chapters)
}

#[tracing::instrument(name = "get chapters by novel", skip_all, fields(novel_id = %novel_id))]
pub async fn get_chapters_by_novel(pool: &PgPool, novel_id: Uuid) -> Result<Vec<Chapter>, Error> {
    let chapters = sqlx::query_as::<_, Chapter>(
        r#"
        SELECT *
        FROM
            chapters
        WHERE
            novel_id = $1
        ORDER BY chapter_number
    "#,
    )
    .bind(novel_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(chapters)
}

#[tracing::instrument(name = "get chapter", skip_all, fields(chapter_id = %chapter_id))]
pub async fn get_chapter(pool: &PgPool, chapter_id: Uuid) -> Result<Chapter, Error> {
    sqlx::query_as::<_, Chapter>(
        r#"
        SELECT *
        FROM
            chapters
        WHERE
            id = $1
    "#,
    )
    .bind(chapter_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Chapter")))
}

#[tracing::instrument(name = "insert chapter", skip_all, fields(novel_id = %data.novel_id))]
pub async fn insert_chapter(pool: &PgPool, data: NewChapter) -> Result<Chapter, Error> {
    let chapter = sqlx::query_as::<_, Chapter>(
        r#"
        INSERT INTO chapters
            (id, novel_id, chapter_number, title, content, views, published_date)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *;
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(data.novel_id)
    .bind(data.chapter_number)
    .bind(data.title)
    .bind(data.content)
    .bind(data.views)
    .bind(data.published_date)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(chapter)
}

#[tracing::instrument(name = "update chapter", skip_all, fields(chapter_id = %chapter_id))]
pub async fn update_chapter(
    pool: &PgPool,
    chapter_id: Uuid,
    changes: ChapterChanges,
) -> Result<Chapter, Error> {
    sqlx::query_as::<_, Chapter>(
        r#"
        UPDATE chapters
        SET
            novel_id = COALESCE($2, novel_id),
            chapter_number = COALESCE($3, chapter_number),
            title = COALESCE($4, title),
            content = COALESCE($5, content),
            views = COALESCE($6, views),
            published_date = COALESCE($7, published_date),
            updated_at = NOW()
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(chapter_id)
    .bind(changes.novel_id)
    .bind(changes.chapter_number)
    .bind(changes.title)
    .bind(changes.content)
    .bind(changes.views)
    .bind(changes.published_date)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Chapter")))
}

#[tracing::instrument(name = "delete chapter", skip_all, fields(chapter_id = %chapter_id))]
pub async fn delete_chapter(pool: &PgPool, chapter_id: Uuid) -> Result<Chapter, Error> {
    sqlx::query_as::<_, Chapter>(
        r#"
        DELETE FROM chapters
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(chapter_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Chapter")))
}

#[tracing::instrument(name = "delete chapters by novel", skip_all, fields(novel_id = %novel_id))]
pub async fn delete_chapters_by_novel(pool: &PgPool, novel_id: Uuid) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM chapters WHERE novel_id = $1;")
        .bind(novel_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}

#[tracing::instrument(name = "delete all chapters", skip_all)]
pub async fn delete_all_chapters(pool: &PgPool) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM chapters;")
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}
