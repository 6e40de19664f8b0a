use std::sync::Arc;

use axum::{Extension, Json, body::Bytes, extract::State, http::StatusCode};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        comment::{
            delete_all_comments, delete_comment, delete_comments_by_chapter,
            delete_comments_by_novel, delete_comments_by_user, get_comment, get_comments,
            get_comments_by_chapter, get_comments_by_novel, get_comments_by_user, get_replies,
            get_reported_comments, insert_comment, like_comment, report_comment,
            unlike_comment, unreport_comment, update_comment,
        },
        user::get_user_by_id_optional,
    },
    error::Error,
    extract::{ApiJson, ApiPath},
    model::{Comment, CommentChanges, CommentReport, CommentView, CurrentUser, DeleteResponse, NewComment},
    state::SharedAppState,
};

use super::{ensure_can_act_for, optional_json};

#[derive(serde::Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(max = 5000, message = "Content length must be at most 5000"))]
    content: Option<String>,
    novel_id: Option<Uuid>,
    chapter_id: Option<Uuid>,
    parent_id: Option<Uuid>,
    user_id: Option<Uuid>,
    user_name: Option<String>,
    user_avatar: Option<String>,

    #[validate(range(min = 0, max = 5, message = "Rating must be between 0 and 5"))]
    rating: Option<i32>,
}

#[derive(serde::Deserialize, Debug, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Content length must be between 1 and 5000"))]
    content: Option<String>,

    #[validate(range(min = 0, max = 5, message = "Rating must be between 0 and 5"))]
    rating: Option<i32>,
}

#[derive(serde::Deserialize, Debug, Default)]
pub struct ReportRequest {
    reason: Option<String>,
}

fn views(comments: Vec<Comment>) -> Json<Vec<CommentView>> {
    Json(comments.into_iter().map(CommentView::from).collect())
}

#[tracing::instrument(name = "[GET] comments", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<CommentView>>, Error> {
    let result = get_comments(&app_state.pool).await?;

    Ok(views(result))
}

#[tracing::instrument(name = "[GET] comments/novel/{novel_id}", skip_all, fields(novel_id = %novel_id))]
pub async fn by_novel(
    State(app_state): State<SharedAppState>,
    ApiPath(novel_id): ApiPath<Uuid>,
) -> Result<Json<Vec<CommentView>>, Error> {
    let result = get_comments_by_novel(&app_state.pool, novel_id).await?;

    Ok(views(result))
}

#[tracing::instrument(name = "[GET] comments/chapter/{chapter_id}", skip_all, fields(chapter_id = %chapter_id))]
pub async fn by_chapter(
    State(app_state): State<SharedAppState>,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> Result<Json<Vec<CommentView>>, Error> {
    let result = get_comments_by_chapter(&app_state.pool, chapter_id).await?;

    Ok(views(result))
}

#[tracing::instrument(name = "[GET] comments/user/{user_id}", skip_all, fields(user_id = %user_id))]
pub async fn by_user(
    State(app_state): State<SharedAppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Vec<CommentView>>, Error> {
    let result = get_comments_by_user(&app_state.pool, user_id).await?;

    Ok(views(result))
}

#[tracing::instrument(name = "[GET] comments/reported", skip_all)]
pub async fn reported(
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<CommentView>>, Error> {
    let result = get_reported_comments(&app_state.pool).await?;

    Ok(views(result))
}

#[tracing::instrument(name = "[GET] comments/{id}", skip_all, fields(comment_id = %id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CommentView>, Error> {
    let result = get_comment(&app_state.pool, id).await?;

    Ok(Json(result.into()))
}

#[tracing::instrument(name = "[GET] comments/{id}/replies", skip_all, fields(comment_id = %id))]
pub async fn replies(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<CommentView>>, Error> {
    let result = get_replies(&app_state.pool, id).await?;

    Ok(views(result))
}

#[tracing::instrument(name = "[POST] comments", skip_all, fields(user_id = %user.id))]
pub async fn store(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiJson(request): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), Error> {
    request.validate().map_err(Error::Validation)?;

    let content = request
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or(Error::BadRequest("Content can not be empty".to_string()))?;
    let novel_id = request
        .novel_id
        .ok_or(Error::BadRequest("Novel ID can not be empty".to_string()))?;

    let author_id = request.user_id.unwrap_or(user.id);
    ensure_can_act_for(&user, author_id)?;

    let (user_name, user_avatar) = match get_user_by_id_optional(&app_state.pool, author_id).await? {
        Some(author) => (author.display_name().to_string(), author.avatar),
        None => (
            request.user_name.unwrap_or_default(),
            request.user_avatar.unwrap_or_default(),
        ),
    };

    let result = insert_comment(
        &app_state.pool,
        NewComment {
            novel_id,
            chapter_id: request.chapter_id,
            parent_id: request.parent_id,
            user_id: author_id,
            user_name,
            user_avatar,
            content,
            rating: request.rating.unwrap_or(0),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

#[tracing::instrument(name = "[PUT] comments/{id}", skip_all, fields(comment_id = %id))]
pub async fn update(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateCommentRequest>,
) -> Result<Json<CommentView>, Error> {
    request.validate().map_err(Error::Validation)?;

    let comment = get_comment(&app_state.pool, id).await?;
    ensure_can_act_for(&user, comment.user_id)?;

    let result = update_comment(
        &app_state.pool,
        id,
        CommentChanges {
            content: request.content,
            rating: request.rating,
        },
    )
    .await?;

    Ok(Json(result.into()))
}

#[tracing::instrument(name = "[DELETE] comments/{id}", skip_all, fields(comment_id = %id))]
pub async fn destroy(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CommentView>, Error> {
    let comment = get_comment(&app_state.pool, id).await?;
    ensure_can_act_for(&user, comment.user_id)?;

    let result = delete_comment(&app_state.pool, id).await?;

    Ok(Json(result.into()))
}

#[tracing::instrument(name = "[POST] comments/{id}/like", skip_all, fields(comment_id = %id, user_id = %user.id))]
pub async fn like(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CommentView>, Error> {
    let result = like_comment(&app_state.pool, id, user.id).await?;

    Ok(Json(result.into()))
}

#[tracing::instrument(name = "[POST] comments/{id}/unlike", skip_all, fields(comment_id = %id, user_id = %user.id))]
pub async fn unlike(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CommentView>, Error> {
    let result = unlike_comment(&app_state.pool, id, user.id).await?;

    Ok(Json(result.into()))
}

#[tracing::instrument(name = "[POST] comments/{id}/report", skip_all, fields(comment_id = %id, user_id = %user.id))]
pub async fn report(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    body: Bytes,
) -> Result<Json<CommentView>, Error> {
    let request: ReportRequest = optional_json(&body)?;

    let result = report_comment(
        &app_state.pool,
        id,
        CommentReport::new(user.id, request.reason),
    )
    .await?;

    Ok(Json(result.into()))
}

#[tracing::instrument(name = "[POST] comments/{id}/unreport", skip_all, fields(comment_id = %id))]
pub async fn unreport(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CommentView>, Error> {
    let result = unreport_comment(&app_state.pool, id).await?;

    Ok(Json(result.into()))
}

#[tracing::instrument(name = "[DELETE] comments", skip_all)]
pub async fn destroy_all(
    State(app_state): State<SharedAppState>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_all_comments(&app_state.pool).await?;

    Ok(Json(DeleteResponse::new(deleted, "comments")))
}

#[tracing::instrument(name = "[DELETE] comments/novel/{novel_id}", skip_all, fields(novel_id = %novel_id))]
pub async fn destroy_by_novel(
    State(app_state): State<SharedAppState>,
    ApiPath(novel_id): ApiPath<Uuid>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_comments_by_novel(&app_state.pool, novel_id).await?;

    Ok(Json(DeleteResponse::scoped(
        deleted,
        "comments",
        &format!("novel {}", novel_id),
    )))
}

#[tracing::instrument(name = "[DELETE] comments/chapter/{chapter_id}", skip_all, fields(chapter_id = %chapter_id))]
pub async fn destroy_by_chapter(
    State(app_state): State<SharedAppState>,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_comments_by_chapter(&app_state.pool, chapter_id).await?;

    Ok(Json(DeleteResponse::scoped(
        deleted,
        "comments",
        &format!("chapter {}", chapter_id),
    )))
}

#[tracing::instrument(name = "[DELETE] comments/user/{user_id}", skip_all, fields(user_id = %user_id))]
pub async fn destroy_by_user(
    State(app_state): State<SharedAppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_comments_by_user(&app_state.pool, user_id).await?;

    Ok(Json(DeleteResponse::scoped(
        deleted,
        "comments",
        &format!("user {}", user_id),
    )))
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::{CreateCommentRequest, UpdateCommentRequest};

    #[test]
    fn rating_is_bounded() {
        let request: CreateCommentRequest =
            serde_json::from_value(serde_json::json!({"content": "ok", "rating": 6})).unwrap();
        assert!(request.validate().is_err());

        let request: UpdateCommentRequest =
            serde_json::from_value(serde_json::json!({"rating": 4})).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn update_rejects_blank_content() {
        let request: UpdateCommentRequest =
            serde_json::from_value(serde_json::json!({"content": ""})).unwrap();

        assert!(request.validate().is_err());
    }
}
