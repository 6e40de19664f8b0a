#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Jwt error")]
    JwtError(jsonwebtoken::errors::Error),
    #[error("Password error")]
    PasswordError(argon2::password_hash::Error),
    #[error("Access denied. No token provided.")]
    Unauthenticated,
    #[error("Invalid or expired token.")]
    InvalidToken,
    #[error("{0}")]
    IncorrectCredential(&'static str),
    #[error("Your account has been deactivated")]
    Inactive,
    #[error("Access denied. Insufficient permissions.")]
    Forbidden,
    #[error("Google login is not configured")]
    ProviderNotConfigured,
    #[error("OAuth error: {0}")]
    OAuth(anyhow::Error),
}
