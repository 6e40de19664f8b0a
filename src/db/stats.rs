use sqlx::PgPool;

use crate::{
    error::Error,
    model::{PlatformStats, TopNovel},
};

use super::error::DatabaseError;

const TOP_NOVELS: i64 = 5;

#[tracing::instrument(name = "get platform stats", skip_all)]
pub async fn get_platform_stats(pool: &PgPool) -> Result<PlatformStats, Error> {
    let totals = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            COUNT(*), COALESCE(SUM(views), 0)::BIGINT
        FROM
            novels
    "#,
    )
    .fetch_one(pool);

    let genres = sqlx::query_scalar::<_, String>(
        r#"
        SELECT name
        FROM
            genres
        ORDER BY name
    "#,
    )
    .fetch_all(pool);

    let top_novels = sqlx::query_as::<_, TopNovel>(
        r#"
        SELECT
            title, author, genres, views
        FROM
            novels
        ORDER BY views DESC
        LIMIT $1
    "#,
    )
    .bind(TOP_NOVELS)
    .fetch_all(pool);

    let ((total_novels, total_views), genres, top_novels) =
        futures::try_join!(totals, genres, top_novels).map_err(DatabaseError::DatabaseError)?;

    Ok(PlatformStats {
        total_novels,
        total_views,
        genres,
        top_novels,
    })
}
