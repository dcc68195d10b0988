// ABOUTME: JWT-based user authentication and authorization
// ABOUTME: HS256 token issue/validation, bearer extraction, admin checks and bcrypt password hashing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Authentication
//!
//! Tokens are HS256 JWTs signed with the server secret. The role travels in
//! the claims so admin checks need no database round-trip.

use chrono::{Duration, Utc};
use http::header::AUTHORIZATION;
use http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mealmate_core::constants::limits::MIN_PASSWORD_LENGTH;
use mealmate_core::models::{User, UserRole};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// `user` or `admin`
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Caller identity extracted from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User `ID`
    pub user_id: Uuid,
    /// User email
    pub email: String,
    /// Role at token issue time
    pub role: UserRole,
}

/// Issues and validates session tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a manager signing with `secret`
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
        }
    }

    /// Token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a `JWT` token for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for an expired token and `AuthInvalid` for any
    /// other validation failure
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        use jsonwebtoken::errors::ErrorKind;

        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::auth_expired(),
                ErrorKind::InvalidSignature => {
                    tracing::warn!("JWT token signature verification failed");
                    AppError::auth_invalid("Token signature verification failed")
                }
                _ => AppError::auth_invalid(format!("Token validation failed: {e}")),
            })
    }

    /// Authenticate the `Authorization: Bearer` header
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the header is missing and `AuthInvalid` or
    /// `AuthExpired` when the token is rejected
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthenticatedUser> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or_else(AppError::auth_required)?
            .to_str()
            .map_err(|_| AppError::auth_invalid("Authorization header is not valid text"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::auth_invalid("Authorization header must use the Bearer scheme"))?;

        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            role: UserRole::from_str_or_default(&claims.role),
        })
    }

    /// Authenticate and require the admin role
    ///
    /// # Errors
    ///
    /// Returns the authentication error, or `PermissionDenied` for non-admins
    pub fn require_admin(&self, headers: &HeaderMap) -> AppResult<AuthenticatedUser> {
        let user = self.authenticate(headers)?;
        if !user.role.is_admin() {
            return Err(AppError::permission_denied("Admin role required").with_user_id(user.user_id));
        }
        Ok(user)
    }
}

/// Hash a password with bcrypt on the blocking pool
///
/// # Errors
///
/// Returns an error if hashing fails or the blocking task panics
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Check a password against a bcrypt hash; malformed hashes never match
///
/// # Errors
///
/// Returns an error if the blocking task panics
pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
}

/// Exactly one `@` with non-empty sides
///
/// # Errors
///
/// Returns `InvalidInput` for malformed addresses
pub fn validate_email(email: &str) -> AppResult<()> {
    let email = email.trim();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && !domain.is_empty() && !domain.contains('@')
    });
    if valid {
        Ok(())
    } else {
        Err(AppError::invalid_input("Invalid email address"))
    }
}

/// At least the minimum length, counted in characters
///
/// # Errors
///
/// Returns `InvalidInput` for short passwords
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Generate a random `JWT` secret from the OS RNG
#[must_use]
pub fn generate_jwt_secret() -> [u8; 64] {
    let mut secret = [0u8; 64];
    OsRng.fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use mealmate_core::errors::ErrorCode;

    fn user(role: UserRole) -> User {
        let mut user = User::new("cook@example.com", "hash".to_owned(), None);
        user.role = role;
        user
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn test_token_round_trip_carries_role() {
        let auth = AuthManager::new(&generate_jwt_secret(), 24);
        let admin = user(UserRole::Admin);
        let token = auth.generate_token(&admin).unwrap_or_default();

        let caller = auth.require_admin(&bearer(&token));
        assert_eq!(caller.map(|c| c.user_id).ok(), Some(admin.id));
    }

    #[test]
    fn test_rejections() {
        let auth = AuthManager::new(b"secret-one", 24);
        let other = AuthManager::new(b"secret-two", 24);
        let expired = AuthManager::new(b"secret-one", -2);
        let regular = user(UserRole::User);

        let foreign = other.generate_token(&regular).unwrap_or_default();
        let stale = expired.generate_token(&regular).unwrap_or_default();
        let fresh = auth.generate_token(&regular).unwrap_or_default();

        let code = |r: AppResult<AuthenticatedUser>| r.err().map(|e| e.code);
        assert_eq!(code(auth.authenticate(&HeaderMap::new())), Some(ErrorCode::AuthRequired));
        assert_eq!(code(auth.authenticate(&bearer(&foreign))), Some(ErrorCode::AuthInvalid));
        assert_eq!(code(auth.authenticate(&bearer(&stale))), Some(ErrorCode::AuthExpired));
        assert_eq!(code(auth.require_admin(&bearer(&fresh))), Some(ErrorCode::PermissionDenied));
    }

    #[test]
    fn test_email_and_password_rules() {
        assert!(validate_email("a@b").is_ok());
        assert!(validate_email("@b").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("plain").is_err());

        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }
}
