use std::sync::Arc;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use crate::{auth::error::AuthError, error::Error, model::CurrentUser};

/// Must run after [`super::jwt_auth_middleware`], which attaches the caller.
#[tracing::instrument(name = "[MIDDLEWARE] admin", skip_all)]
pub async fn admin_middleware(req: Request, next: Next) -> Result<Response<Body>, Error> {
    let is_admin = req
        .extensions()
        .get::<Arc<CurrentUser>>()
        .ok_or(Error::Auth(AuthError::Unauthenticated))?
        .is_admin();

    if !is_admin {
        return Err(Error::Auth(AuthError::Forbidden));
    }

    Ok(next.run(req).await)
}
