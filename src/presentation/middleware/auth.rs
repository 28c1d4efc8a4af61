//! Authentication Middleware
//!
//! Bearer token validation for protected routes.

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Authentication middleware that validates bearer tokens.
///
/// On success the (possibly refreshed) token is returned to the client as an
/// `Authorization` cookie.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    // Check for Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let session = state.auth.verify_token(token).await?;
    let cookie = HeaderValue::from_str(&format!("Authorization={}; HttpOnly", session.token))
        .map_err(|_| AppError::Unauthorized("Invalid token".into()))?;

    request.extensions_mut().insert(AuthUser {
        user_id: session.user_id,
    });

    let mut response = next.run(request).await;
    response.headers_mut().append(SET_COOKIE, cookie);

    Ok(response)
}
