use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{Genre, GenreChanges, NewGenre},
};

use super::error::DatabaseError;

const GENRE_CONFLICT: &str = "Genre name or slug already exists";

#[tracing::instrument(name = "get genres", skip_all)]
pub async fn get_genres(pool: &PgPool) -> Result<Vec<Genre>, Error> {
    let genres = sqlx::query_as::<_, Genre>(
        r#"
        SELECT *
        FROM
            genres
        ORDER BY name
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(genres)
}

#[tracing::instrument(name = "get genre", skip_all, fields(genre_id = %genre_id))]
pub async fn get_genre(pool: &PgPool, genre_id: Uuid) -> Result<Genre, Error> {
    sqlx::query_as::<_, Genre>(
        r#"
        SELECT *
        FROM
            genres
        WHERE
            id = $1
    "#,
    )
    .bind(genre_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Genre")))
}

#[tracing::instrument(name = "get genre by slug", skip_all, fields(slug = %slug))]
pub async fn get_genre_by_slug(pool: &PgPool, slug: &str) -> Result<Genre, Error> {
    sqlx::query_as::<_, Genre>(
        r#"
        SELECT *
        FROM
            genres
        WHERE
            slug = $1
    "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Genre")))
}

#[tracing::instrument(name = "insert genre", skip_all, fields(name = %data.name))]
pub async fn insert_genre(pool: &PgPool, data: NewGenre) -> Result<Genre, Error> {
    let genre = sqlx::query_as::<_, Genre>(
        r#"
        INSERT INTO genres
            (id, name, slug, description)
        VALUES
            ($1, $2, $3, $4)
        RETURNING *;
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(data.name)
    .bind(data.slug)
    .bind(data.description)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::unique_violation(e, GENRE_CONFLICT))?;

    Ok(genre)
}

/// Updates the genre and, when its name changes, renames it inside every
/// novel's genre list in the same transaction.
#[tracing::instrument(name = "update genre", skip_all, fields(genre_id = %genre_id))]
pub async fn update_genre(
    pool: &PgPool,
    genre_id: Uuid,
    changes: GenreChanges,
) -> Result<Genre, Error> {
    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let old_name: String = sqlx::query_scalar(
        r#"
        SELECT name
        FROM
            genres
        WHERE
            id = $1
        FOR UPDATE
    "#,
    )
    .bind(genre_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Genre")))?;

    let genre = sqlx::query_as::<_, Genre>(
        r#"
        UPDATE genres
        SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            description = COALESCE($4, description),
            updated_at = NOW()
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(genre_id)
    .bind(changes.name)
    .bind(changes.slug)
    .bind(changes.description)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| DatabaseError::unique_violation(e, GENRE_CONFLICT))?;

    if genre.name != old_name {
        let result = sqlx::query(
            r#"
            UPDATE novels
            SET
                genres = array_replace(genres, $1, $2),
                updated_at = NOW()
            WHERE
                $1 = ANY(genres)
        "#,
        )
        .bind(&old_name)
        .bind(&genre.name)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

        tracing::info!(
            old_name = %old_name,
            new_name = %genre.name,
            novels = result.rows_affected(),
            "Renamed genre on novels"
        );
    }

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(genre)
}

#[tracing::instrument(name = "delete genre", skip_all, fields(genre_id = %genre_id))]
pub async fn delete_genre(pool: &PgPool, genre_id: Uuid) -> Result<Genre, Error> {
    sqlx::query_as::<_, Genre>(
        r#"
        DELETE FROM genres
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(genre_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Genre")))
}

#[tracing::instrument(name = "delete all genres", skip_all)]
pub async fn delete_all_genres(pool: &PgPool) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM genres;")
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}
