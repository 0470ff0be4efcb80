use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::User;
use crate::AppState;

const TOKEN_KEYWORD: &str = "Token";

/// The authenticated caller, resolved from `Authorization: Token <key>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub is_staff: bool,
}

impl From<User> for AuthUser {
    fn from(u: User) -> Self {
        AuthUser {
            user_id: u.id,
            email: u.email,
            is_staff: u.is_staff,
        }
    }
}

/// Tokens are stored as the hex SHA-256 of the key.
pub fn hash_token(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

/// Pulls the key out of an `Authorization` header value.
///
/// Another scheme (e.g. `Basic`) counts as no credentials at all; a `Token`
/// header with a missing or space-containing key is invalid.
pub fn parse_token_header(value: &str) -> Result<&str, AppError> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or(AppError::NotAuthenticated)?;
    if !scheme.eq_ignore_ascii_case(TOKEN_KEYWORD) {
        return Err(AppError::NotAuthenticated);
    }
    let key = parts.next().ok_or(AppError::InvalidToken)?;
    if parts.next().is_some() {
        return Err(AppError::InvalidToken);
    }
    Ok(key)
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::NotAuthenticated)?
            .to_str()
            .map_err(|_| AppError::InvalidToken)?;

        let key = parse_token_header(header_value)?;
        let key_hash = hash_token(key);

        // Cache first; a Redis failure is logged and treated as a miss
        match state.cache.get_cached_auth_user(&key_hash).await {
            Ok(Some(cached)) => match serde_json::from_str::<AuthUser>(&cached) {
                Ok(user) => return Ok(user),
                Err(e) => warn!("Discarding unreadable cached auth entry: {}", e),
            },
            Ok(None) => {
                if state.cache.is_enabled() {
                    debug!("Auth cache miss");
                }
            }
            Err(e) => warn!("Auth cache lookup failed: {}", e),
        }

        let user: AuthUser = User::find_by_token_hash(&state.db.pool, &key_hash)
            .await?
            .ok_or(AppError::InvalidToken)?
            .into();

        if let Ok(json) = serde_json::to_string(&user) {
            if let Err(e) = state.cache.cache_auth_user(&key_hash, &json).await {
                warn!("Failed to cache auth user {}: {}", user.user_id, e);
            }
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_header_yields_key() {
        assert_eq!(parse_token_header("Token abc123").unwrap(), "abc123");
        assert_eq!(parse_token_header("token abc123").unwrap(), "abc123");
    }

    #[test]
    fn other_scheme_is_unauthenticated() {
        assert!(matches!(
            parse_token_header("Basic dXNlcjpwYXNz"),
            Err(AppError::NotAuthenticated)
        ));
        assert!(matches!(parse_token_header(""), Err(AppError::NotAuthenticated)));
    }

    #[test]
    fn malformed_token_header_is_invalid() {
        assert!(matches!(parse_token_header("Token"), Err(AppError::InvalidToken)));
        assert!(matches!(
            parse_token_header("Token abc def"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
