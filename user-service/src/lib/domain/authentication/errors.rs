use thiserror::Error;

use crate::user::errors::UserError;

/// Error for credential validation, token issuance and token resolution.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Client-facing rejections, all reported as 401
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Missing authorization header")]
    MissingToken,

    #[error("Malformed authorization header: {0}")]
    MalformedHeader(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token subject no longer exists")]
    UnknownSubject,

    #[error("Token was issued before the last credential change")]
    StaleToken,

    // Infrastructure errors
    #[error("Token issuance failed: {0}")]
    Issuance(String),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error(transparent)]
    User(#[from] UserError),
}
