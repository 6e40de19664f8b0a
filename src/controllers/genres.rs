use std::borrow::Cow;

use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;
use validator::{Validate, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    db::genre::{
        delete_all_genres, delete_genre, get_genre, get_genre_by_slug, get_genres, insert_genre,
        update_genre,
    },
    error::Error,
    extract::{ApiJson, ApiPath},
    model::{DeleteResponse, Genre, GenreChanges, NewGenre, is_valid_slug},
    state::SharedAppState,
};

#[derive(serde::Deserialize, Debug)]
pub struct GenreRequest {
    name: Option<String>,
    slug: Option<String>,
    description: Option<String>,
}

impl Validate for GenreRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = &self.name {
            if !name.trim().validate_length(Some(1), Some(100), None) {
                errors.add(
                    "name",
                    ValidationError::new("name_length")
                        .with_message(Cow::from("Name length must be between 1 and 100")),
                );
            }
        }

        if let Some(slug) = &self.slug {
            if !is_valid_slug(slug) {
                errors.add(
                    "slug",
                    ValidationError::new("slug_format").with_message(Cow::from(
                        "Slug must be lowercase letters and digits separated by hyphens",
                    )),
                );
            }
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[tracing::instrument(name = "[GET] genres", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Vec<Genre>>, Error> {
    let result = get_genres(&app_state.pool).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] genres/{id}", skip_all, fields(genre_id = %id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Genre>, Error> {
    let result = get_genre(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] genres/slug/{slug}", skip_all, fields(slug = %slug))]
pub async fn show_by_slug(
    State(app_state): State<SharedAppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<Genre>, Error> {
    let result = get_genre_by_slug(&app_state.pool, &slug).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] genres", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    ApiJson(request): ApiJson<GenreRequest>,
) -> Result<(StatusCode, Json<Genre>), Error> {
    request.validate().map_err(Error::Validation)?;

    let (name, slug) = match (request.name, request.slug) {
        (Some(name), Some(slug)) => (name.trim().to_string(), slug),
        _ => return Err(Error::BadRequest("Name and slug are required".to_string())),
    };

    let result = insert_genre(
        &app_state.pool,
        NewGenre {
            name,
            slug,
            description: request.description.unwrap_or_default(),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] genres/{id}", skip_all, fields(genre_id = %id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<GenreRequest>,
) -> Result<Json<Genre>, Error> {
    request.validate().map_err(Error::Validation)?;

    let result = update_genre(
        &app_state.pool,
        id,
        GenreChanges {
            name: request.name.map(|name| name.trim().to_string()),
            slug: request.slug,
            description: request.description,
        },
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] genres/{id}", skip_all, fields(genre_id = %id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Genre>, Error> {
    let result = delete_genre(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] genres", skip_all)]
pub async fn destroy_all(
    State(app_state): State<SharedAppState>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_all_genres(&app_state.pool).await?;

    Ok(Json(DeleteResponse::new(deleted, "genres")))
}
