use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use auth::JwtError;
use auth::PasswordError;
use chrono::Duration;
use uuid::Uuid;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::IssuedToken;
use crate::domain::authentication::ports::AuthServicePort;
use crate::user::models::User;
use crate::user::ports::UserServicePort;

/// Domain service implementation for login and token resolution.
///
/// Looks users up through the directory service rather than the
/// repository, so every rule the directory enforces applies here too.
pub struct AuthService<US>
where
    US: UserServicePort,
{
    users: Arc<US>,
    authenticator: Arc<Authenticator>,
    token_ttl: Duration,
    // Verified against when the email is unknown so both failure paths pay for one hash.
    dummy_hash: String,
}

impl<US> AuthService<US>
where
    US: UserServicePort,
{
    /// Create a new auth service.
    ///
    /// # Arguments
    /// * `users` - Directory service used for lookups
    /// * `authenticator` - Password verifier and token codec
    /// * `token_ttl` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `PasswordError` - The placeholder digest could not be computed
    pub fn new(
        users: Arc<US>,
        authenticator: Arc<Authenticator>,
        token_ttl: Duration,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = authenticator.hash_password(&Uuid::new_v4().to_string())?;

        Ok(Self {
            users,
            authenticator,
            token_ttl,
            dummy_hash,
        })
    }
}

#[async_trait]
impl<US> AuthServicePort for AuthService<US>
where
    US: UserServicePort,
{
    async fn validate_credentials(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.users.get_user_by_email(email).await? else {
            self.authenticator
                .verify_password(password, &self.dummy_hash)?;
            return Err(AuthError::InvalidCredentials);
        };

        if self
            .authenticator
            .verify_password(password, &user.password_hash)?
        {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn issue_token(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let claims = Claims::for_user(user.id, user.email.as_str(), self.token_ttl)
            .map_err(|e| AuthError::Issuance(e.to_string()))?
            .with_token_version(i64::from(user.token_version))
            .with_jwt_id(Uuid::new_v4());

        let access_token = self
            .authenticator
            .generate_token(&claims)
            .map_err(|e| AuthError::Issuance(e.to_string()))?;

        Ok(IssuedToken::bearer(
            access_token,
            self.token_ttl.num_seconds(),
        ))
    }

    async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let user = self.validate_credentials(email, password).await?;
        let token = self.issue_token(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(token)
    }

    async fn resolve_token(&self, token: &str) -> Result<User, AuthError> {
        let claims: Claims = self
            .authenticator
            .validate_token(token)
            .map_err(|e| match e {
                JwtError::TokenExpired => AuthError::TokenExpired,
                other => AuthError::InvalidToken(other.to_string()),
            })?;

        if claims.exp.is_none() {
            return Err(AuthError::InvalidToken("missing exp claim".to_string()));
        }

        let email = claims
            .email()
            .ok_or_else(|| AuthError::InvalidToken("missing email claim".to_string()))?;

        let user = self
            .users
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        // The email may since have been re-registered by someone else.
        if claims.sub.as_deref() != Some(user.id.to_string().as_str()) {
            return Err(AuthError::UnknownSubject);
        }

        if claims.token_version() != Some(i64::from(user.token_version)) {
            return Err(AuthError::StaleToken);
        }

        Ok(user)
    }
}
