use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Generic JWT claims structure.
///
/// Carries the registered claims this service issues plus custom fields via
/// the `extra` map. Every registered claim is optional on the wire; callers
/// decide which ones they require.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Claims {
    /// Subject (user/entity identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// JWT ID (unique token identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    const EMAIL: &'static str = "email";
    const TOKEN_VERSION: &'static str = "token_version";

    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create session claims for an authenticated user.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier (stored in `sub`)
    /// * `email` - Login email (stored in `extra.email`)
    /// * `ttl` - Lifetime of the token from now
    ///
    /// # Returns
    /// Claims with sub, exp, iat, and email set
    ///
    /// # Errors
    /// * `LifetimeOutOfRange` - `now + ttl` is not a representable timestamp
    pub fn for_user(user_id: impl ToString, email: &str, ttl: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or(JwtError::LifetimeOutOfRange)?;

        Ok(Self::new()
            .with_subject(user_id)
            .with_issued_at(now.timestamp())
            .with_expiration(expiration.timestamp())
            .with_extra(Self::EMAIL, email))
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set JWT ID.
    pub fn with_jwt_id(mut self, jti: impl ToString) -> Self {
        self.jti = Some(jti.to_string());
        self
    }

    /// Set the credential generation the token was issued for.
    pub fn with_token_version(self, version: i64) -> Self {
        self.with_extra(Self::TOKEN_VERSION, version)
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Get email from extra fields.
    pub fn email(&self) -> Option<&str> {
        self.extra.get(Self::EMAIL).and_then(|v| v.as_str())
    }

    /// Get credential generation from extra fields.
    pub fn token_version(&self) -> Option<i64> {
        self.extra.get(Self::TOKEN_VERSION).and_then(|v| v.as_i64())
    }
}
