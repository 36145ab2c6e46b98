use async_trait::async_trait;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::IssuedToken;
use crate::user::models::User;

/// Port for login and bearer token resolution.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Check an email and plaintext password against the stored digest.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `User` - Directory lookup failed
    async fn validate_credentials(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Sign session claims for an already authenticated user.
    ///
    /// # Errors
    /// * `Issuance` - Token signing failed
    async fn issue_token(&self, user: &User) -> Result<IssuedToken, AuthError>;

    /// Validate credentials and issue a token in one step.
    async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError>;

    /// Verify a presented bearer token and resolve it to the current user.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its `exp`
    /// * `InvalidToken` - Bad signature, malformed token or missing claims
    /// * `UnknownSubject` - User was deleted or changed email
    /// * `StaleToken` - Password changed after issuance
    async fn resolve_token(&self, token: &str) -> Result<User, AuthError>;
}
