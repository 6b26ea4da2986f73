use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::http::HeaderMap;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::User;
use crate::database::users;
use crate::error::ApiError;

/// Custom header carrying the opaque bearer token
pub const AUTH_HEADER: &str = "X-Authorization";

/// Extract the bearer token from the request headers, if present
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Generate a fresh opaque session token. Tokens are random identifiers with
/// no structure; the stored copy on the user row is the only session state.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Resolve the bearer token to a user, failing with 401 when the header is
/// missing or no user holds the token.
pub async fn require_user(pool: &PgPool, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = token_from_headers(headers)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized: No token provided"))?;

    users::find_by_token(pool, &token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized: Invalid token"))
}

/// Hash a password with Argon2id and a fresh salt
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })
}

/// Verify a candidate password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::error!("Stored password hash is malformed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn tokens_are_unique_and_opaque() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn header_extraction_ignores_blank_values() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(AUTH_HEADER, HeaderValue::from_static("  "));
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(AUTH_HEADER, HeaderValue::from_static("abc123"));
        assert_eq!(token_from_headers(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn password_round_trip_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
