use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    config::Jwt,
    error::Error,
    model::{CurrentUser, Role, User},
};

use super::error::AuthError;

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct Claim {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    aud: String,
    iss: String,
    exp: usize,
    iat: usize,
}

impl From<Claim> for CurrentUser {
    fn from(claim: Claim) -> Self {
        CurrentUser {
            id: claim.sub,
            username: claim.username,
            email: claim.email,
            role: claim.role,
        }
    }
}

pub fn encode_jwt(user: &User, jwt: &Jwt) -> Result<String, Error> {
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(jwt.expires_in_hours);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claim = Claim {
        sub: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        aud: jwt.aud.expose_secret().to_string(),
        iss: jwt.iss.expose_secret().to_string(),
        iat,
        exp,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(jwt.secret.expose_secret().as_bytes()),
    )
    .map_err(|e| Error::Auth(AuthError::JwtError(e)))
}

pub fn decode_jwt(jwt_token: &str, jwt: &Jwt) -> Result<TokenData<Claim>, Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[jwt.iss.expose_secret()]);
    validation.set_audience(&[jwt.aud.expose_secret()]);

    decode::<Claim>(
        jwt_token,
        &DecodingKey::from_secret(jwt.secret.expose_secret().as_bytes()),
        &validation,
    )
    .map_err(|e| Error::Auth(AuthError::JwtError(e)))
}
