use std::{path::Path, sync::Arc};

use axum::{Extension, Json, body::Bytes, extract::State, http::StatusCode};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::novel::{
        delete_all_novels, delete_novel, get_favorite_novels, get_novel, get_novels,
        insert_novel, toggle_favorite, update_novel,
    },
    error::Error,
    extract::{ApiJson, ApiPath, ApiQuery},
    media::persist_cover_image,
    model::{CurrentUser, DeleteResponse, NewNovel, Novel, NovelChanges, NovelFilter, NovelStatus},
    state::{AppState, SharedAppState},
};

use super::{ensure_can_act_for, optional_json};

#[derive(serde::Deserialize, Debug, Validate)]
pub struct NovelQuery {
    genre: Option<String>,
    status: Option<String>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, message = "Limit must be a positive number"))]
    limit: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 0, message = "Offset must not be negative"))]
    offset: Option<i64>,
}

impl TryFrom<NovelQuery> for NovelFilter {
    type Error = Error;

    fn try_from(query: NovelQuery) -> Result<Self, Self::Error> {
        let status = query
            .status
            .filter(|status| !status.is_empty())
            .map(|status| status.parse::<NovelStatus>())
            .transpose()
            .map_err(|e| Error::BadRequest(format!("Invalid status: {}", e.value)))?;

        Ok(NovelFilter {
            genre: query.genre.filter(|genre| !genre.is_empty()),
            status,
            limit: query.limit,
            offset: query.offset.unwrap_or(0),
        })
    }
}

#[derive(serde::Deserialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovelRequest {
    #[validate(length(min = 1, max = 255, message = "Title length must be between 1 and 255"))]
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    genres: Option<Vec<String>>,
    cover_image: Option<String>,
    status: Option<NovelStatus>,

    #[validate(range(min = 0, message = "Views must not be negative"))]
    views: Option<i64>,
}

#[derive(serde::Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    user_id: Option<Uuid>,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub message: String,
    pub favorited: bool,
    pub novel: Novel,
}

async fn persist_cover(app_state: &AppState, cover: Option<String>) -> Option<String> {
    match (cover, &app_state.config.storage.covers_dir) {
        (Some(cover), Some(covers_dir)) => Some(
            persist_cover_image(&app_state.http_client, Path::new(covers_dir), cover).await,
        ),
        (cover, _) => cover,
    }
}

#[tracing::instrument(name = "[GET] novels", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    ApiQuery(query): ApiQuery<NovelQuery>,
) -> Result<Json<Vec<Novel>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let result = get_novels(&app_state.pool, query.try_into()?).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] novels/{id}", skip_all, fields(novel_id = %id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Novel>, Error> {
    let result = get_novel(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] novels", skip_all)]
pub async fn store(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiJson(request): ApiJson<NovelRequest>,
) -> Result<(StatusCode, Json<Novel>), Error> {
    request.validate().map_err(Error::Validation)?;

    let title = request
        .title
        .ok_or(Error::BadRequest("Title can not be empty".to_string()))?;
    let cover_image = persist_cover(&app_state, request.cover_image).await;

    let result = insert_novel(
        &app_state.pool,
        NewNovel {
            title,
            author: request.author,
            description: request.description,
            genres: request.genres.unwrap_or_default(),
            cover_image,
            status: request.status.unwrap_or_default(),
            views: request.views.unwrap_or(0),
            created_by: Some(user.id),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] novels/{id}", skip_all, fields(novel_id = %id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<NovelRequest>,
) -> Result<Json<Novel>, Error> {
    request.validate().map_err(Error::Validation)?;

    let cover_image = persist_cover(&app_state, request.cover_image).await;

    let result = update_novel(
        &app_state.pool,
        id,
        NovelChanges {
            title: request.title,
            author: request.author,
            description: request.description,
            genres: request.genres,
            cover_image,
            status: request.status,
            views: request.views,
        },
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] novels/{id}", skip_all, fields(novel_id = %id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Novel>, Error> {
    let result = delete_novel(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] novels", skip_all)]
pub async fn destroy_all(
    State(app_state): State<SharedAppState>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_all_novels(&app_state.pool).await?;

    Ok(Json(DeleteResponse::new(deleted, "novels")))
}

#[tracing::instrument(name = "[POST] novels/{id}/favorite", skip_all, fields(novel_id = %id))]
pub async fn favorite(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    body: Bytes,
) -> Result<Json<FavoriteResponse>, Error> {
    let request: FavoriteRequest = optional_json(&body)?;
    let user_id = request.user_id.unwrap_or(user.id);
    ensure_can_act_for(&user, user_id)?;

    let (novel, favorited) = toggle_favorite(&app_state.pool, id, user_id).await?;

    let message = if favorited {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };

    Ok(Json(FavoriteResponse {
        message: message.to_string(),
        favorited,
        novel,
    }))
}

#[tracing::instrument(name = "[GET] novels/favorites/{user_id}", skip_all, fields(user_id = %user_id))]
pub async fn favorites(
    State(app_state): State<SharedAppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Novel>>, Error> {
    let result = get_favorite_novels(&app_state.pool, user_id).await?;

    Ok(Json(result))
}
