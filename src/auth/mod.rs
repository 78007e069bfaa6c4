//! Access tokens for the gateway's protected routes.
//!
//! Tokens are compact JWTs signed with a server-held secret (HS256). They
//! are signed, not encrypted: the claim set is readable by anyone and must
//! never carry secrets. Verification is stateless; nothing is persisted
//! between requests.

use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthSettings;

pub mod middleware;

/// Identity claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Typed verification outcomes. Bad input never panics; callers branch on
/// the kind rather than parsing message strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingHeader,
    #[error("invalid authorization format, use: Bearer <token>")]
    BadFormat,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

/// Precomputed signing material, shared read-only across requests.
#[derive(Clone)]
pub struct AuthState {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl_secs: i64,
}

impl AuthState {
    pub fn new(settings: &AuthSettings) -> Self {
        let mut validation = Validation::default();
        // Expiry is exact; the default 60s leeway would let freshly
        // expired tokens through.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            validation,
            token_ttl_secs: settings.token_ttl_secs,
        }
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl_secs
    }

    /// Issue a token for the given identity, expiring after the configured
    /// TTL.
    pub fn issue_token(
        &self,
        sub: &str,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            email: email.map(str::to_string),
            role: role.map(str::to_string),
            exp: now + self.token_ttl_secs,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate signature and expiry, returning the claims on success.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The shape check is strict: exactly two parts, the first literally
/// `Bearer`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        &["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(AuthError::BadFormat),
    }
}
