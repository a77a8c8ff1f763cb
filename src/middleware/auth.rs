use axum::{extract::FromRequestParts, http::header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Authenticated actor. Whether it acts as buyer or seller depends on the
/// endpoint; ownership is enforced by the queries themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::NotAuthenticated)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::NotAuthenticated)?;
    Ok(AuthUser { user_id })
}

/// Sign a bearer token for `user_id`, valid for `ttl`.
pub fn encode_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_str = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::NotAuthenticated)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::NotAuthenticated)?;

        decode_token(token, &state.jwt_secret)
    }
}
