use std::borrow::Cow;

use anyhow::Context;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    auth::{
        encode_jwt,
        error::AuthError,
        oauth::{encode_state, verify_state},
        verify_password_hash,
    },
    db::error::DatabaseError,
    db::user::{create_user, external_identity_login, get_user_entity_by_email, user_exists},
    error::Error,
    extract::{ApiJson, ApiQuery},
    model::{User, UserEntity},
    state::SharedAppState,
    telemetry::spawn_blocking_with_tracing,
};

const INVALID_CREDENTIAL: &str = "Invalid email or password";

fn empty_secret() -> SecretString {
    SecretString::from("")
}

fn add_error(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: &'static str,
) {
    errors.add(
        field,
        ValidationError::new(code).with_message(Cow::from(message)),
    );
}

fn validate_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        add_error(errors, "email", "email_required", "Email can not be empty");
    } else if !email.validate_email() {
        add_error(errors, "email", "email_email", "Incorrect email format");
    } else if !email.validate_length(None, Some(100), None) {
        add_error(
            errors,
            "email",
            "email_length",
            "Email length must be at most 100",
        );
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.username.is_empty() {
            add_error(
                &mut errors,
                "username",
                "username_required",
                "Username can not be empty",
            );
        } else if !self.username.validate_length(Some(3), Some(30), None) {
            add_error(
                &mut errors,
                "username",
                "username_length",
                "Username length must be between 3 and 30",
            );
        }

        validate_email(&mut errors, &self.email);

        let password = self.password.expose_secret();
        if password.is_empty() {
            add_error(
                &mut errors,
                "password",
                "password_required",
                "Password can not be empty",
            );
        } else if !password.validate_length(Some(6), Some(128), None) {
            add_error(
                &mut errors,
                "password",
                "password_length",
                "Password length must be between 6 and 128",
            );
        }

        if let Some(full_name) = &self.full_name {
            if !full_name.validate_length(None, Some(100), None) {
                add_error(
                    &mut errors,
                    "full_name",
                    "full_name_length",
                    "Full name length must be at most 100",
                );
            }
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_email(&mut errors, &self.email);

        if self.password.expose_secret().is_empty() {
            add_error(
                &mut errors,
                "password",
                "password_required",
                "Password can not be empty",
            );
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

#[tracing::instrument(name = "[POST] auth/register", skip_all)]
pub async fn register(
    State(app_state): State<SharedAppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    request.validate().map_err(Error::Validation)?;

    if user_exists(&app_state.pool, &request.email, &request.username).await? {
        return Err(Error::Database(DatabaseError::Conflict(
            "Username or email already exists".to_string(),
        )));
    }

    let user = create_user(
        &app_state.pool,
        request.username,
        request.email,
        request.password,
        request.full_name.unwrap_or_default(),
        request.avatar.unwrap_or_default(),
    )
    .await?;

    let token = encode_jwt(&user, &app_state.config.jwt)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user,
        }),
    ))
}

#[tracing::instrument(name = "[POST] auth/login", skip_all)]
pub async fn login(
    State(app_state): State<SharedAppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, Error> {
    request.validate().map_err(Error::Validation)?;

    let UserEntity { user, password } = get_user_entity_by_email(&app_state.pool, &request.email)
        .await?
        .ok_or(Error::Auth(AuthError::IncorrectCredential(INVALID_CREDENTIAL)))?;

    spawn_blocking_with_tracing(move || verify_password_hash(password, request.password))
        .await
        .context("verify password hash")
        .map_err(Error::Other)?
        .map_err(|_| Error::Auth(AuthError::IncorrectCredential(INVALID_CREDENTIAL)))?;

    if !user.is_active {
        return Err(Error::Auth(AuthError::Inactive));
    }

    let token = encode_jwt(&user, &app_state.config.jwt)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

#[tracing::instrument(name = "[GET] auth/google", skip_all)]
pub async fn google_redirect(State(app_state): State<SharedAppState>) -> Result<Redirect, Error> {
    let google = app_state
        .google
        .as_ref()
        .ok_or(Error::Auth(AuthError::ProviderNotConfigured))?;

    let state = encode_state(&app_state.config.jwt)?;

    Ok(Redirect::to(&google.authorize_url(state)))
}

#[derive(Deserialize, Debug)]
pub struct GoogleCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[tracing::instrument(name = "[GET] auth/google/callback", skip_all)]
pub async fn google_callback(
    State(app_state): State<SharedAppState>,
    ApiQuery(query): ApiQuery<GoogleCallback>,
) -> Result<Response, Error> {
    let google = app_state
        .google
        .as_ref()
        .ok_or(Error::Auth(AuthError::ProviderNotConfigured))?;

    if let Some(error) = query.error {
        return Err(Error::Auth(AuthError::OAuth(anyhow::anyhow!(
            "provider returned error: {}",
            error
        ))));
    }

    let state = query
        .state
        .ok_or(Error::BadRequest("Missing state parameter".to_string()))?;
    verify_state(&state, &app_state.config.jwt)?;

    let code = query
        .code
        .ok_or(Error::BadRequest("Missing authorization code".to_string()))?;

    let access_token = google.exchange_code(code).await?;
    let profile = google
        .fetch_profile(&app_state.http_client, &access_token)
        .await?;

    let user = external_identity_login(&app_state.pool, &profile).await?;
    if !user.is_active {
        return Err(Error::Auth(AuthError::Inactive));
    }

    let token = encode_jwt(&user, &app_state.config.jwt)?;

    let response = match google.success_redirect() {
        Some(url) => Redirect::to(&format!("{}?token={}", url, token)).into_response(),
        None => Json(AuthResponse {
            message: "Login successful".to_string(),
            token,
            user,
        })
        .into_response(),
    };

    Ok(response)
}
