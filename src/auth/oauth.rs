//! Google sign-in: consent redirect, code exchange and profile lookup.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl, basic::BasicClient, reqwest::async_http_client,
};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    config::{GoogleOAuth, Jwt},
    error::Error,
    model::ExternalProfile,
};

use super::error::AuthError;

const STATE_TTL_MINUTES: i64 = 10;

#[derive(Clone)]
pub struct GoogleClient {
    client: BasicClient,
    config: GoogleOAuth,
}

#[derive(serde::Deserialize, Debug)]
struct GoogleUserInfo {
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleClient {
    pub fn new(config: GoogleOAuth) -> Result<Self, anyhow::Error> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(
                config.client_secret.expose_secret().to_string(),
            )),
            AuthUrl::new(config.auth_url.clone())?,
            Some(TokenUrl::new(config.token_url.clone())?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone())?);

        Ok(Self { client, config })
    }

    pub fn success_redirect(&self) -> Option<&str> {
        self.config.success_redirect.as_deref()
    }

    pub fn authorize_url(&self, state: String) -> String {
        let (url, _) = self
            .client
            .authorize_url(move || CsrfToken::new(state))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url();

        url.to_string()
    }

    #[tracing::instrument(name = "exchange google code", skip_all)]
    pub async fn exchange_code(&self, code: String) -> Result<String, Error> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::OAuth(anyhow::anyhow!("token exchange failed: {}", e)))?;

        Ok(token.access_token().secret().to_string())
    }

    #[tracing::instrument(name = "fetch google profile", skip_all)]
    pub async fn fetch_profile(
        &self,
        http_client: &reqwest::Client,
        access_token: &str,
    ) -> Result<ExternalProfile, Error> {
        let response = http_client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::OAuth(e.into()))?;

        if !response.status().is_success() {
            return Err(AuthError::OAuth(anyhow::anyhow!(
                "profile request failed: {}",
                response.status()
            ))
            .into());
        }

        let info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| AuthError::OAuth(e.into()))?;

        Ok(ExternalProfile {
            provider_id: info.id,
            email: info.email,
            display_name: info.name,
            avatar: info.picture,
        })
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
struct StateClaim {
    nonce: Uuid,
    aud: String,
    iss: String,
    exp: usize,
}

fn state_audience(jwt: &Jwt) -> String {
    format!("{}/oauth-state", jwt.aud.expose_secret())
}

/// Short-lived signed `state` parameter, verified on callback instead of a server-side session.
pub fn encode_state(jwt: &Jwt) -> Result<String, Error> {
    let claim = StateClaim {
        nonce: Uuid::new_v4(),
        aud: state_audience(jwt),
        iss: jwt.iss.expose_secret().to_string(),
        exp: (Utc::now() + Duration::minutes(STATE_TTL_MINUTES)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(jwt.secret.expose_secret().as_bytes()),
    )
    .map_err(|e| Error::Auth(AuthError::JwtError(e)))
}

pub fn verify_state(state: &str, jwt: &Jwt) -> Result<(), Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[jwt.iss.expose_secret()]);
    validation.set_audience(&[state_audience(jwt)]);

    decode::<StateClaim>(
        state,
        &DecodingKey::from_secret(jwt.secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|_| ())
    .map_err(|e| Error::Auth(AuthError::OAuth(e.into())))
}
