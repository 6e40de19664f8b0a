use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::reading_history::{
        clear_history, get_reading_history, remove_from_history, upsert_reading_history,
    },
    error::Error,
    extract::{ApiJson, ApiPath, ApiQuery},
    model::{CurrentUser, DeleteResponse, HistoryEntry, ReadingHistoryEntry},
    state::SharedAppState,
};

use super::ensure_can_act_for;

#[derive(serde::Deserialize, Debug, Validate)]
pub struct HistoryQuery {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, message = "Limit must be a positive number"))]
    limit: Option<i64>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    novel_id: Option<Uuid>,
    chapter_id: Option<Uuid>,
    chapter_title: Option<String>,
    novel_title: Option<String>,
    novel_cover: Option<String>,
}

impl TryFrom<HistoryRequest> for HistoryEntry {
    type Error = Error;

    fn try_from(request: HistoryRequest) -> Result<Self, Self::Error> {
        let (novel_id, chapter_id) = match (request.novel_id, request.chapter_id) {
            (Some(novel_id), Some(chapter_id)) => (novel_id, chapter_id),
            _ => {
                return Err(Error::BadRequest(
                    "Novel ID and Chapter ID are required".to_string(),
                ));
            }
        };

        Ok(HistoryEntry {
            novel_id,
            chapter_id,
            chapter_title: request.chapter_title,
            novel_title: request.novel_title,
            novel_cover: request.novel_cover,
        })
    }
}

#[tracing::instrument(name = "[GET] reading-history/{user_id}", skip_all, fields(user_id = %user_id))]
pub async fn index(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<Json<Vec<ReadingHistoryEntry>>, Error> {
    ensure_can_act_for(&user, user_id)?;
    query.validate().map_err(Error::Validation)?;

    let result = get_reading_history(&app_state.pool, user_id, query.limit).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] reading-history/{user_id}/add", skip_all, fields(user_id = %user_id))]
pub async fn add(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<HistoryRequest>,
) -> Result<Json<ReadingHistoryEntry>, Error> {
    ensure_can_act_for(&user, user_id)?;

    let result = upsert_reading_history(&app_state.pool, user_id, request.try_into()?).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] reading-history/{user_id}/remove/{novel_id}", skip_all, fields(user_id = %user_id, novel_id = %novel_id))]
pub async fn remove(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath((user_id, novel_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<DeleteResponse>, Error> {
    ensure_can_act_for(&user, user_id)?;

    let deleted = remove_from_history(&app_state.pool, user_id, novel_id).await?;

    Ok(Json(DeleteResponse::scoped(
        deleted,
        "reading history entries",
        &format!("novel {}", novel_id),
    )))
}

#[tracing::instrument(name = "[DELETE] reading-history/{user_id}/clear", skip_all, fields(user_id = %user_id))]
pub async fn clear(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<DeleteResponse>, Error> {
    ensure_can_act_for(&user, user_id)?;

    let deleted = clear_history(&app_state.pool, user_id).await?;

    Ok(Json(DeleteResponse::scoped(
        deleted,
        "reading history entries",
        &format!("user {}", user_id),
    )))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use validator::Validate;

    use crate::model::HistoryEntry;

    use super::{HistoryQuery, HistoryRequest};

    #[test]
    fn entry_needs_novel_and_chapter() {
        let request: HistoryRequest =
            serde_json::from_value(serde_json::json!({"novelId": Uuid::new_v4()})).unwrap();

        let result: Result<HistoryEntry, _> = request.try_into();
        assert_eq!(
            result.err().map(|e| e.to_string()).as_deref(),
            Some("Novel ID and Chapter ID are required")
        );
    }

    #[test]
    fn entry_keeps_display_fields() {
        let novel_id = Uuid::new_v4();
        let chapter_id = Uuid::new_v4();
        let request: HistoryRequest = serde_json::from_value(serde_json::json!({
            "novelId": novel_id,
            "chapterId": chapter_id,
            "chapterTitle": "Chapter 3",
            "novelTitle": "The Long Road"
        }))
        .unwrap();

        let entry: HistoryEntry = request.try_into().unwrap();
        assert_eq!(entry.novel_id, novel_id);
        assert_eq!(entry.chapter_id, chapter_id);
        assert_eq!(entry.chapter_title.as_deref(), Some("Chapter 3"));
        assert_eq!(entry.novel_cover, None);
    }

    #[test]
    fn limit_must_be_positive() {
        let query: HistoryQuery =
            serde_json::from_value(serde_json::json!({"limit": "0"})).unwrap();

        assert!(query.validate().is_err());
    }
}
