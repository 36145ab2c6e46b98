use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::authentication::errors::AuthError;
use crate::domain::user::models::User;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the caller resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

/// Middleware that resolves the bearer token to a user and adds it to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req).map_err(reject)?;

    let user = state
        .auth_service
        .resolve_token(token)
        .await
        .map_err(reject)?;

    req.extensions_mut().insert(AuthenticatedUser { user });

    Ok(next.run(req).await)
}

fn reject(err: AuthError) -> ApiError {
    tracing::warn!(error = %err, "Request rejected by auth guard");
    ApiError::from(err)
}

fn extract_token_from_header(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("header is not valid UTF-8".to_string()))?;

    let (scheme, token) = auth_str
        .split_once(' ')
        .ok_or_else(|| AuthError::MalformedHeader("expected: Bearer <token>".to_string()))?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::MalformedHeader(format!(
            "unsupported scheme {scheme:?}"
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader("empty bearer token".to_string()));
    }

    Ok(token)
}
