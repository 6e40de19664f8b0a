use std::{borrow::Cow, sync::Arc};

use anyhow::Context;
use axum::{Extension, Json, extract::State};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;
use validator::{Validate, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    auth::{error::AuthError, verify_password_hash},
    db::{
        error::DatabaseError,
        user::{
            delete_all_users, delete_user, get_active_users, get_user_by_id,
            get_user_entity_by_id, get_users, get_users_by_role, update_user,
            update_user_password,
        },
    },
    error::Error,
    extract::{ApiJson, ApiPath},
    model::{CurrentUser, DeleteResponse, Role, User, UserChanges},
    state::SharedAppState,
    telemetry::spawn_blocking_with_tracing,
};

use super::ensure_can_act_for;

fn empty_secret() -> SecretString {
    SecretString::from("")
}

#[derive(serde::Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(max = 100, message = "Full name length must be at most 100"))]
    full_name: Option<String>,

    #[validate(length(max = 2048, message = "Avatar length must be at most 2048"))]
    avatar: Option<String>,
}

#[derive(serde::Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRequest {
    #[validate(length(max = 100, message = "Full name length must be at most 100"))]
    full_name: Option<String>,

    #[validate(length(max = 2048, message = "Avatar length must be at most 2048"))]
    avatar: Option<String>,

    role: Option<Role>,
    is_active: Option<bool>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default = "empty_secret")]
    current_password: SecretString,
    #[serde(default = "empty_secret")]
    new_password: SecretString,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.current_password.expose_secret().is_empty() {
            errors.add(
                "current_password",
                ValidationError::new("current_password_required")
                    .with_message(Cow::from("Current password can not be empty")),
            );
        }

        let new_password = self.new_password.expose_secret();
        if new_password.is_empty() {
            errors.add(
                "new_password",
                ValidationError::new("new_password_required")
                    .with_message(Cow::from("New password can not be empty")),
            );
        } else if !new_password.validate_length(Some(6), Some(128), None) {
            errors.add(
                "new_password",
                ValidationError::new("new_password_length")
                    .with_message(Cow::from("New password length must be between 6 and 128")),
            );
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(serde::Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[tracing::instrument(name = "[GET] users", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Vec<User>>, Error> {
    let result = get_users(&app_state.pool).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] users/active", skip_all)]
pub async fn active(State(app_state): State<SharedAppState>) -> Result<Json<Vec<User>>, Error> {
    let result = get_active_users(&app_state.pool).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] users/role/{role}", skip_all, fields(role = %role))]
pub async fn by_role(
    State(app_state): State<SharedAppState>,
    ApiPath(role): ApiPath<String>,
) -> Result<Json<Vec<User>>, Error> {
    let role = role
        .parse::<Role>()
        .map_err(|e| Error::BadRequest(format!("Invalid role: {}", e.value)))?;

    let result = get_users_by_role(&app_state.pool, role).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] users/{id}", skip_all, fields(user_id = %id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, Error> {
    let result = get_user_by_id(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[PUT] users/{id}", skip_all, fields(user_id = %id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AdminUserRequest>,
) -> Result<Json<User>, Error> {
    request.validate().map_err(Error::Validation)?;

    let result = update_user(
        &app_state.pool,
        id,
        UserChanges {
            full_name: request.full_name,
            avatar: request.avatar,
            role: request.role,
            is_active: request.is_active,
        },
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] users/{id}", skip_all, fields(user_id = %id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, Error> {
    let result = delete_user(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] users", skip_all)]
pub async fn destroy_all(
    State(app_state): State<SharedAppState>,
) -> Result<Json<DeleteResponse>, Error> {
    let deleted = delete_all_users(&app_state.pool).await?;

    Ok(Json(DeleteResponse::new(deleted, "users")))
}

#[tracing::instrument(name = "[GET] users/profile/{id}", skip_all, fields(user_id = %id))]
pub async fn profile(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, Error> {
    ensure_can_act_for(&user, id)?;

    let result = get_user_by_id(&app_state.pool, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[PUT] users/profile/{id}", skip_all, fields(user_id = %id))]
pub async fn update_profile(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ProfileRequest>,
) -> Result<Json<User>, Error> {
    ensure_can_act_for(&user, id)?;
    request.validate().map_err(Error::Validation)?;

    let result = update_user(
        &app_state.pool,
        id,
        UserChanges {
            full_name: request.full_name,
            avatar: request.avatar,
            ..Default::default()
        },
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[PUT] users/change-password/{id}", skip_all, fields(user_id = %id))]
pub async fn change_password(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, Error> {
    ensure_can_act_for(&user, id)?;
    request.validate().map_err(Error::Validation)?;

    let entity = get_user_entity_by_id(&app_state.pool, id)
        .await?
        .ok_or(Error::Database(DatabaseError::NotFound("User")))?;

    let current_password = request.current_password;
    spawn_blocking_with_tracing(move || verify_password_hash(entity.password, current_password))
        .await
        .context("verify password hash")
        .map_err(Error::Other)?
        .map_err(|_| {
            Error::Auth(AuthError::IncorrectCredential(
                "Current password is incorrect",
            ))
        })?;

    update_user_password(&app_state.pool, id, request.new_password).await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use crate::{error::validation_message, model::Role};

    use super::{AdminUserRequest, ChangePasswordRequest};

    #[test]
    fn change_password_requires_both_fields() {
        let request: ChangePasswordRequest =
            serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(
            validation_message(&request.validate().unwrap_err()),
            "Current password can not be empty, New password can not be empty"
        );
    }

    #[test]
    fn change_password_bounds_new_password() {
        let request: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "currentPassword": "old-secret",
            "newPassword": "123"
        }))
        .unwrap();

        assert_eq!(
            validation_message(&request.validate().unwrap_err()),
            "New password length must be between 6 and 128"
        );
    }

    #[test]
    fn admin_request_parses_role_and_flag() {
        let request: AdminUserRequest =
            serde_json::from_value(serde_json::json!({"role": "admin", "isActive": false}))
                .unwrap();

        assert_eq!(request.role, Some(Role::Admin));
        assert_eq!(request.is_active, Some(false));
        assert!(
            serde_json::from_value::<AdminUserRequest>(serde_json::json!({"role": "owner"}))
                .is_err()
        );
    }
}
