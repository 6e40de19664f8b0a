use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{Comment, CommentChanges, CommentReport, NewComment},
};

use super::{PostgresTransaction, error::DatabaseError};

#[tracing::instrument(name = "get comments", skip_all)]
pub async fn get_comments(pool: &PgPool) -> Result<Vec<Comment>, Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM
            comments
        ORDER BY created_at DESC
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(comments)
}

#[tracing::instrument(name = "get comments by novel", skip_all, fields(novel_id = %novel_id))]
pub async fn get_comments_by_novel(pool: &PgPool, novel_id: Uuid) -> Result<Vec<Comment>, Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM
            comments
        WHERE
            novel_id = $1
        ORDER BY created_at DESC
    "#,
    )
    .bind(novel_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(comments)
}

#[tracing::instrument(name = "get comments by chapter", skip_all, fields(chapter_id = %chapter_id))]
pub async fn get_comments_by_chapter(
    pool: &PgPool,
    chapter_id: Uuid,
) -> Result<Vec<Comment>, Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM
            comments
        WHERE
            chapter_id = $1
        ORDER BY created_at DESC
    "#,
    )
    .bind(chapter_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(comments)
}

#[tracing::instrument(name = "get comments by user", skip_all, fields(user_id = %user_id))]
pub async fn get_comments_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Comment>, Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM
            comments
        WHERE
            user_id = $1
        ORDER BY created_at DESC
    "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(comments)
}

/// Direct replies only, oldest first.
#[tracing::instrument(name = "get comment replies", skip_all, fields(parent_id = %parent_id))]
pub async fn get_replies(pool: &PgPool, parent_id: Uuid) -> Result<Vec<Comment>, Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM
            comments
        WHERE
            parent_id = $1
        ORDER BY created_at
    "#,
    )
    .bind(parent_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(comments)
}

#[tracing::instrument(name = "get reported comments", skip_all)]
pub async fn get_reported_comments(pool: &PgPool) -> Result<Vec<Comment>, Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM
            comments
        WHERE
            reported
        ORDER BY updated_at DESC
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(comments)
}

#[tracing::instrument(name = "get comment", skip_all, fields(comment_id = %comment_id))]
pub async fn get_comment(pool: &PgPool, comment_id: Uuid) -> Result<Comment, Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM
            comments
        WHERE
            id = $1
    "#,
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Comment")))
}

#[tracing::instrument(name = "insert comment", skip_all, fields(novel_id = %data.novel_id, user_id = %data.user_id))]
pub async fn insert_comment(pool: &PgPool, data: NewComment) -> Result<Comment, Error> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments
            (id, novel_id, chapter_id, parent_id, user_id, user_name, user_avatar, content, rating)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *;
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(data.novel_id)
    .bind(data.chapter_id)
    .bind(data.parent_id)
    .bind(data.user_id)
    .bind(data.user_name)
    .bind(data.user_avatar)
    .bind(data.content)
    .bind(data.rating)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(comment)
}

#[tracing::instrument(name = "update comment", skip_all, fields(comment_id = %comment_id))]
pub async fn update_comment(
    pool: &PgPool,
    comment_id: Uuid,
    changes: CommentChanges,
) -> Result<Comment, Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET
            content = COALESCE($2, content),
            rating = COALESCE($3, rating),
            updated_at = NOW()
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(comment_id)
    .bind(changes.content)
    .bind(changes.rating)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Comment")))
}

async fn lock_comment(tx: &mut PostgresTransaction, comment_id: Uuid) -> Result<Comment, Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM
            comments
        WHERE
            id = $1
        FOR UPDATE
    "#,
    )
    .bind(comment_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Comment")))
}

/// Locks the row, applies `mutate` and writes likes/reports back when it reports a change.
async fn mutate_comment<F>(pool: &PgPool, comment_id: Uuid, mutate: F) -> Result<Comment, Error>
where
    F: FnOnce(&mut Comment) -> bool + Send,
{
    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let mut comment = lock_comment(&mut tx, comment_id).await?;

    if !mutate(&mut comment) {
        tx.commit().await.map_err(DatabaseError::DatabaseError)?;
        return Ok(comment);
    }

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET
            likes = $2,
            reports = $3,
            updated_at = NOW()
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(comment.id)
    .bind(&comment.likes)
    .bind(Json(&comment.reports))
    .fetch_one(&mut *tx)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(comment)
}

#[tracing::instrument(name = "like comment", skip_all, fields(comment_id = %comment_id, user_id = %user_id))]
pub async fn like_comment(pool: &PgPool, comment_id: Uuid, user_id: Uuid) -> Result<Comment, Error> {
    mutate_comment(pool, comment_id, |comment| comment.like(user_id)).await
}

#[tracing::instrument(name = "unlike comment", skip_all, fields(comment_id = %comment_id, user_id = %user_id))]
pub async fn unlike_comment(
    pool: &PgPool,
    comment_id: Uuid,
    user_id: Uuid,
) -> Result<Comment, Error> {
    mutate_comment(pool, comment_id, |comment| comment.unlike(user_id)).await
}

#[tracing::instrument(name = "report comment", skip_all, fields(comment_id = %comment_id, user_id = %report.user_id))]
pub async fn report_comment(
    pool: &PgPool,
    comment_id: Uuid,
    report: CommentReport,
) -> Result<Comment, Error> {
    mutate_comment(pool, comment_id, move |comment| comment.report(report)).await
}

#[tracing::instrument(name = "unreport comment", skip_all, fields(comment_id = %comment_id))]
pub async fn unreport_comment(pool: &PgPool, comment_id: Uuid) -> Result<Comment, Error> {
    mutate_comment(pool, comment_id, |comment| {
        let had_reports = comment.is_reported();
        comment.clear_reports();
        had_reports
    })
    .await
}

#[tracing::instrument(name = "delete comment", skip_all, fields(comment_id = %comment_id))]
pub async fn delete_comment(pool: &PgPool, comment_id: Uuid) -> Result<Comment, Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        DELETE FROM comments
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Comment")))
}

#[tracing::instrument(name = "delete all comments", skip_all)]
pub async fn delete_all_comments(pool: &PgPool) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM comments;")
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}

#[tracing::instrument(name = "delete comments by novel", skip_all, fields(novel_id = %novel_id))]
pub async fn delete_comments_by_novel(pool: &PgPool, novel_id: Uuid) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM comments WHERE novel_id = $1;")
        .bind(novel_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}

#[tracing::instrument(name = "delete comments by chapter", skip_all, fields(chapter_id = %chapter_id))]
pub async fn delete_comments_by_chapter(pool: &PgPool, chapter_id: Uuid) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM comments WHERE chapter_id = $1;")
        .bind(chapter_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}

#[tracing::instrument(name = "delete comments by user", skip_all, fields(user_id = %user_id))]
pub async fn delete_comments_by_user(pool: &PgPool, user_id: Uuid) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM comments WHERE user_id = $1;")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}
