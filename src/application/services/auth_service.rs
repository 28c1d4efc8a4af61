//! Authentication Service
//!
//! Verifies bearer tokens and keeps sessions alive by re-issuing tokens that
//! are close to expiry. Issuing the first token belongs to the identity
//! service; [`JwtAuthProvider::issue_token`] exists for tooling and tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::domain::UserId;
use crate::shared::error::AppError;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: UserId,
    /// Token to hand back to the client; may differ from the one presented.
    pub token: String,
}

/// Token verification contract used by the HTTP layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Validate a token and resolve the caller.
    async fn verify_token(&self, token: &str) -> Result<AuthSession, AppError>;
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// HS256 JWT provider sharing its secret with the identity service.
pub struct JwtAuthProvider {
    settings: JwtSettings,
}

impl JwtAuthProvider {
    pub fn new(settings: JwtSettings) -> Self {
        Self { settings }
    }

    /// Sign a fresh access token for `user_id`.
    pub fn issue_token(&self, user_id: UserId) -> Result<String, AppError> {
        self.issue_token_expiring(user_id, Duration::minutes(self.settings.access_token_expiry_minutes))
    }

    fn issue_token_expiring(&self, user_id: UserId, lifetime: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token expired".into())
            }
            _ => AppError::Unauthorized("Invalid token".into()),
        })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn verify_token(&self, token: &str) -> Result<AuthSession, AppError> {
        let claims = self.decode_token(token)?;

        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".into()))?;

        let refresh_after = Utc::now() + Duration::minutes(self.settings.refresh_window_minutes);
        let token = if claims.exp <= refresh_after.timestamp() {
            debug!(user_id = %user_id, "Refreshing access token");
            self.issue_token(user_id)?
        } else {
            token.to_string()
        };

        Ok(AuthSession { user_id, token })
    }
}
