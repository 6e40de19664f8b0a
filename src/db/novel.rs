use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{NewNovel, Novel, NovelChanges, NovelFilter},
};

use super::{PostgresTransaction, error::DatabaseError};

#[tracing::instrument(name = "get novels", skip_all)]
pub async fn get_novels(pool: &PgPool, filter: NovelFilter) -> Result<Vec<Novel>, Error> {
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"
        SELECT *
        FROM
            novels
        WHERE TRUE
    "#,
    );

    if let Some(genre) = filter.genre {
        query_builder
            .push(" AND ")
            .push_bind(genre)
            .push(" = ANY(genres)");
    }

    if let Some(status) = filter.status {
        query_builder
            .push(" AND status = ")
            .push_bind(status.as_str());
    }

    query_builder.push(" ORDER BY created_at DESC");

    if let Some(limit) = filter.limit {
        query_builder.push(" LIMIT ").push_bind(limit);
    }

    if filter.offset > 0 {
        query_builder.push(" OFFSET ").push_bind(filter.offset);
    }

    let novels = query_builder
        .build_query_as::<Novel>()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(novels)
}

#[tracing::instrument(name = "get novel", skip_all, fields(novel_id = %novel_id))]
pub async fn get_novel(pool: &PgPool, novel_id: Uuid) -> Result<Novel, Error> {
    sqlx::query_as::<_, Novel>(
        r#"
        SELECT *
        FROM
            novels
        WHERE
            id = $1
    "#,
    )
    .bind(novel_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Novel")))
}

#[tracing::instrument(name = "insert novel", skip_all, fields(title = %data.title))]
pub async fn insert_novel(pool: &PgPool, data: NewNovel) -> Result<Novel, Error> {
    let novel = sqlx::query_as::<_, Novel>(
        r#"
        INSERT INTO novels
            (id, title, author, description, genres, cover_image, status, views, created_by)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *;
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(data.title)
    .bind(data.author)
    .bind(data.description)
    .bind(data.genres)
    .bind(data.cover_image)
    .bind(data.status.as_str())
    .bind(data.views)
    .bind(data.created_by)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(novel)
}

#[tracing::instrument(name = "update novel", skip_all, fields(novel_id = %novel_id))]
pub async fn update_novel(
    pool: &PgPool,
    novel_id: Uuid,
    changes: NovelChanges,
) -> Result<Novel, Error> {
    sqlx::query_as::<_, Novel>(
        r#"
        UPDATE novels
        SET
            title = COALESCE($2, title),
            author = COALESCE($3, author),
            description = COALESCE($4, description),
            genres = COALESCE($5, genres),
            cover_image = COALESCE($6, cover_image),
            status = COALESCE($7, status),
            views = COALESCE($8, views),
            updated_at = NOW()
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(novel_id)
    .bind(changes.title)
    .bind(changes.author)
    .bind(changes.description)
    .bind(changes.genres)
    .bind(changes.cover_image)
    .bind(changes.status.map(|status| status.as_str()))
    .bind(changes.views)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Novel")))
}

#[tracing::instrument(name = "delete novel", skip_all, fields(novel_id = %novel_id))]
pub async fn delete_novel(pool: &PgPool, novel_id: Uuid) -> Result<Novel, Error> {
    sqlx::query_as::<_, Novel>(
        r#"
        DELETE FROM novels
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(novel_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Novel")))
}

#[tracing::instrument(name = "delete all novels", skip_all)]
pub async fn delete_all_novels(pool: &PgPool) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM novels;")
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}

async fn lock_novel(tx: &mut PostgresTransaction, novel_id: Uuid) -> Result<Novel, Error> {
    sqlx::query_as::<_, Novel>(
        r#"
        SELECT *
        FROM
            novels
        WHERE
            id = $1
        FOR UPDATE
    "#,
    )
    .bind(novel_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Novel")))
}

/// Toggles `user_id` in the favorite set under a row lock.
/// Returns the stored novel and whether the user now favors it.
#[tracing::instrument(name = "toggle novel favorite", skip_all, fields(novel_id = %novel_id, user_id = %user_id))]
pub async fn toggle_favorite(
    pool: &PgPool,
    novel_id: Uuid,
    user_id: Uuid,
) -> Result<(Novel, bool), Error> {
    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let mut novel = lock_novel(&mut tx, novel_id).await?;
    let favorited = novel.toggle_favorite(user_id);

    let novel = sqlx::query_as::<_, Novel>(
        r#"
        UPDATE novels
        SET
            favorited_by = $2,
            likes = $3
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(novel.id)
    .bind(&novel.favorited_by)
    .bind(novel.likes)
    .fetch_one(&mut *tx)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok((novel, favorited))
}

#[tracing::instrument(name = "get favorite novels", skip_all, fields(user_id = %user_id))]
pub async fn get_favorite_novels(pool: &PgPool, user_id: Uuid) -> Result<Vec<Novel>, Error> {
    let novels = sqlx::query_as::<_, Novel>(
        r#"
        SELECT *
        FROM
            novels
        WHERE
            $1 = ANY(favorited_by)
        ORDER BY updated_at DESC
    "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(novels)
}
