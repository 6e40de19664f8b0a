use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{decode_jwt, error::AuthError},
    error::Error,
    model::CurrentUser,
    state::SharedAppState,
};

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, Error> {
    let auth_header = match headers.get(AUTHORIZATION) {
        Some(header) => header
            .to_str()
            .map_err(|_| Error::Auth(AuthError::InvalidToken))?,
        None => return Ok(None),
    };

    let mut header = auth_header.split_whitespace();
    let (bearer_option, token_option) = (header.next(), header.next());

    match (bearer_option, token_option) {
        (Some(bearer), Some(token)) if bearer.eq_ignore_ascii_case("bearer") => Ok(Some(token)),
        _ => Err(Error::Auth(AuthError::InvalidToken)),
    }
}

fn current_user(app_state: &SharedAppState, token: &str) -> Result<Arc<CurrentUser>, Error> {
    let token_data = decode_jwt(token, &app_state.config.jwt)
        .map_err(|_| Error::Auth(AuthError::InvalidToken))?;

    Ok(Arc::new(CurrentUser::from(token_data.claims)))
}

/// Rejects the request unless it carries a valid bearer token.
#[tracing::instrument(name = "[MIDDLEWARE] jwt auth", skip_all, fields(user_id))]
pub async fn jwt_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let token = bearer_token(req.headers())?.ok_or(Error::Auth(AuthError::Unauthenticated))?;
    let user = current_user(&app_state, token)?;

    tracing::Span::current().record("user_id", tracing::field::display(user.id));
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Attaches the caller when a valid token is present; anonymous requests pass through.
#[tracing::instrument(name = "[MIDDLEWARE] optional auth", skip_all)]
pub async fn optional_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let user = match bearer_token(req.headers()) {
        Ok(Some(token)) => current_user(&app_state, token).ok(),
        _ => None,
    };

    if let Some(user) = user {
        req.extensions_mut().insert(user);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

    use super::bearer_token;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(bearer_token(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), Some("abc"));
    }

    #[test]
    fn malformed_header_is_rejected() {
        assert!(bearer_token(&headers("Basic abc")).is_err());
        assert!(bearer_token(&headers("Bearer")).is_err());
    }
}
