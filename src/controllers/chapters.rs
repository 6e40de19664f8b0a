use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::chapter::{
        delete_all_chapters, delete_chapter, delete_chapters_by_novel, get_chapter,
        get_chapters, get_chapters_by_novel, insert_chapter, update_chapter,
    },
    error::Error,
    extract::{ApiJson, ApiPath},
    model::{Chapter, ChapterChanges, DeleteResponse, NewChapter},
    state::SharedAppState,
};

#[derive(serde::Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRequest {
    novel_id: Option<Uuid>,

    #[validate(range(min = 0, message = "Chapter number must not be negative"))]
    chapter_number: Option<i32>,

    #[validate(length(min = 1, max = 255, message = "Title length must be between 1 and 255"))]
    title: Option<String>,

    content: Option<String>,

    #[validate(range(min = 0, message = "Views must not be negative"))]
    views: Option<i64>,

    published_date: Option<DateTime<Utc>>,
}

#[tracing::instrument(name = "[GET] chapters", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Vec<Chapter>>, Error> {
    let result = get_chapters(&app_state.pool).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] chapters/novel/{novel_id}", skip_all, fields(novel_id = %novel_id))]
pub async fn by_novel(
    State(app_state): State<SharedAppState>,
    ApiPath(novel_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Chapter>>, Error> {
    let result = get_chapters_by_novel(&app_state.pool, novel_id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] chapters/{id}", skip_all, fields(chapter_id = %id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Chapter>, Error> {
    let result = get_chapter(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] chapters", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    ApiJson(request): ApiJson<ChapterRequest>,
) -> Result<(StatusCode, Json<Chapter>), Error> {
    request.validate().map_err(Error::Validation)?;

    let title = request
        .title
        .ok_or(Error::BadRequest("Title can not be empty".to_string()))?;
    let novel_id = request
        .novel_id
        .ok_or(Error::BadRequest("Novel ID can not be empty".to_string()))?;

    let result = insert_chapter(
        &app_state.pool,
        NewChapter {
            novel_id,
            chapter_number: request.chapter_number.unwrap_or(0),
            title,
            content: request.content.unwrap_or_default(),
            views: request.views.unwrap_or(0),
            published_date: request.published_date.unwrap_or_else(Utc::now),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] chapters/{id}", skip_all, fields(chapter_id = %id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ChapterRequest>,
) -> Result<Json<Chapter>, Error> {
    request.validate().map_err(Error::Validation)?;

    let result = update_chapter(
        &app_state.pool,
        id,
        ChapterChanges {
            novel_id: request.novel_id,
            chapter_number: request.chapter_number,
            title: request.title,
            content: request.content,
            views: request.views,
            published_date: request.published_date,
        },
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] chapters/{id}", skip_all, fields(chapter_id = %id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Chapter>, Error> {
    let result = delete_chapter(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] chapters", skip_all)]
pub async fn destroy_all(
    State(app_state): State<SharedAppState>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_all_chapters(&app_state.pool).await?;

    Ok(Json(DeleteResponse::new(deleted, "chapters")))
}

#[tracing::instrument(name = "[DELETE] chapters/novel/{novel_id}", skip_all, fields(novel_id = %novel_id))]
pub async fn destroy_by_novel(
    State(app_state): State<SharedAppState>,
    ApiPath(novel_id): ApiPath<Uuid>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_chapters_by_novel(&app_state.pool, novel_id).await?;

    Ok(Json(DeleteResponse::scoped(
        deleted,
        "chapters",
        &format!("novel {}", novel_id),
    )))
}
