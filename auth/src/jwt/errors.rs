use thiserror::Error;

/// Error type for JWT operations.
///
/// `TokenExpired` is only reported for correctly signed tokens past their `exp`.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token lifetime is out of range")]
    LifetimeOutOfRange,
}
