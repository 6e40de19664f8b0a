use anyhow::Context;
use rand::Rng;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::compute_password_hash,
    error::Error,
    model::{ExternalProfile, NewUser, Role, User, UserChanges, UserEntity, generate_username},
    telemetry::spawn_blocking_with_tracing,
};

use super::error::DatabaseError;

#[tracing::instrument(name = "get users", skip_all)]
pub async fn get_users(pool: &PgPool) -> Result<Vec<User>, Error> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT *
        FROM
            users
        ORDER BY created_at
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(users)
}

#[tracing::instrument(name = "get active users", skip_all)]
pub async fn get_active_users(pool: &PgPool) -> Result<Vec<User>, Error> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT *
        FROM
            users
        WHERE
            is_active = TRUE
        ORDER BY created_at
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(users)
}

#[tracing::instrument(name = "get users by role", skip_all, fields(role = role.as_str()))]
pub async fn get_users_by_role(pool: &PgPool, role: Role) -> Result<Vec<User>, Error> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT *
        FROM
            users
        WHERE
            role = $1
        ORDER BY created_at
    "#,
    )
    .bind(role.as_str())
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(users)
}

#[tracing::instrument(name = "get user by id", skip_all, fields(user_id = %user_id))]
pub async fn get_user_by_id_optional(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT *
        FROM
            users
        WHERE
            id = $1
    "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<User, Error> {
    get_user_by_id_optional(pool, user_id)
        .await?
        .ok_or(Error::Database(DatabaseError::NotFound("User")))
}

#[tracing::instrument(name = "get user entity by id", skip_all, fields(user_id = %user_id))]
pub async fn get_user_entity_by_id(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserEntity>, Error> {
    sqlx::query_as::<_, UserEntity>(
        r#"
        SELECT *
        FROM
            users
        WHERE
            id = $1
    "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

#[tracing::instrument(name = "get user entity by email", skip_all, fields(email = %email))]
pub async fn get_user_entity_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserEntity>, Error> {
    sqlx::query_as::<_, UserEntity>(
        r#"
        SELECT *
        FROM
            users
        WHERE
            email = $1
    "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

#[tracing::instrument(name = "check user exists", skip_all, fields(email = %email, username = %username))]
pub async fn user_exists(pool: &PgPool, email: &str, username: &str) -> Result<bool, Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM users WHERE email = $1 OR username = $2
        )
    "#,
    )
    .bind(email)
    .bind(username)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(exists)
}

#[tracing::instrument(name = "insert user", skip_all, fields(username = %new_user.username))]
pub async fn insert_user(pool: &PgPool, new_user: NewUser) -> Result<User, Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users
            (id, username, email, password, full_name, avatar, role, is_active, google_id)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, TRUE, $8)
        RETURNING *;
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password)
    .bind(&new_user.full_name)
    .bind(&new_user.avatar)
    .bind(Role::User.as_str())
    .bind(&new_user.google_id)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::unique_violation(e, "Username or email already exists"))?;

    Ok(user)
}

#[tracing::instrument(name = "create user", skip_all, fields(username = %username, email = %email))]
pub async fn create_user(
    pool: &PgPool,
    username: String,
    email: String,
    password: SecretString,
    full_name: String,
    avatar: String,
) -> Result<User, Error> {
    let password_hashed = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("compute password hash")
        .map_err(Error::Other)??;

    insert_user(
        pool,
        NewUser {
            username,
            email,
            password: Some(password_hashed),
            full_name,
            avatar,
            google_id: None,
        },
    )
    .await
}

#[tracing::instrument(name = "update user", skip_all, fields(user_id = %user_id))]
pub async fn update_user(pool: &PgPool, user_id: Uuid, changes: UserChanges) -> Result<User, Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET
            full_name = COALESCE($2, full_name),
            avatar = COALESCE($3, avatar),
            role = COALESCE($4, role),
            is_active = COALESCE($5, is_active),
            updated_at = NOW()
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(user_id)
    .bind(changes.full_name)
    .bind(changes.avatar)
    .bind(changes.role.map(|role| role.as_str()))
    .bind(changes.is_active)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("User")))
}

#[tracing::instrument(name = "update user password", skip_all, fields(user_id = %user_id))]
pub async fn update_user_password(
    pool: &PgPool,
    user_id: Uuid,
    password: SecretString,
) -> Result<(), Error> {
    let password_hashed = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("compute password hash")
        .map_err(Error::Other)??;

    let result = sqlx::query(
        r#"
        UPDATE users
        SET
            password = $2,
            updated_at = NOW()
        WHERE
            id = $1;
    "#,
    )
    .bind(user_id)
    .bind(password_hashed)
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("User")));
    }

    Ok(())
}

#[tracing::instrument(name = "delete user", skip_all, fields(user_id = %user_id))]
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<User, Error> {
    sqlx::query_as::<_, User>(
        r#"
        DELETE FROM users
        WHERE
            id = $1
        RETURNING *;
    "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("User")))
}

#[tracing::instrument(name = "delete all users", skip_all)]
pub async fn delete_all_users(pool: &PgPool) -> Result<u64, Error> {
    let result = sqlx::query("DELETE FROM users;")
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected())
}

/// Resolves a provider identity to an account: known provider id, then an
/// existing account with the same email (linked), else a fresh account.
#[tracing::instrument(name = "external identity login", skip_all, fields(email = %profile.email))]
pub async fn external_identity_login(
    pool: &PgPool,
    profile: &ExternalProfile,
) -> Result<User, Error> {
    let linked = sqlx::query_as::<_, User>(
        r#"
        SELECT *
        FROM
            users
        WHERE
            google_id = $1
    "#,
    )
    .bind(&profile.provider_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if let Some(user) = linked {
        return Ok(user);
    }

    let by_email = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET
            google_id = $2,
            avatar = CASE WHEN avatar = '' THEN $3 ELSE avatar END,
            updated_at = NOW()
        WHERE
            email = $1
        RETURNING *;
    "#,
    )
    .bind(&profile.email)
    .bind(&profile.provider_id)
    .bind(profile.avatar.clone().unwrap_or_default())
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if let Some(user) = by_email {
        tracing::info!(user_id = %user.id, "Linked google account to existing user");
        return Ok(user);
    }

    let suffix: u32 = rand::rng().random_range(1_000..1_000_000);

    insert_user(
        pool,
        NewUser {
            username: generate_username(&profile.email, suffix),
            email: profile.email.clone(),
            password: None,
            full_name: profile.display_name.clone().unwrap_or_default(),
            avatar: profile.avatar.clone().unwrap_or_default(),
            google_id: Some(profile.provider_id.clone()),
        },
    )
    .await
}
