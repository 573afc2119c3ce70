//! Operator authentication and session tokens
//!
//! Login is split in two injected pieces: a [`CredentialVerifier`] decides
//! whether a username/password pair is valid, and [`SessionKeys`] issues and
//! checks the signed token stored in the session cookie.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AuthConfig;
use crate::error::Result;

/// Session cookie name
pub const SESSION_COOKIE: &str = "forwarder_session";

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (operator username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
}

/// Decides whether login credentials are valid
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// The single operator account from configuration
pub struct OperatorAccount {
    username: String,
    password: String,
}

impl OperatorAccount {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl CredentialVerifier for OperatorAccount {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Session token signing configuration
pub struct SessionKeys {
    /// Secret key for signing tokens
    secret: String,
    /// Token expiration duration
    expiration: Duration,
}

impl SessionKeys {
    /// Create new session keys
    pub fn new(secret: String, expiration_hours: u64) -> Self {
        Self {
            secret,
            expiration: Duration::from_secs(expiration_hours * 3600),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.session_secret.clone(), config.session_hours)
    }

    /// Session lifetime in seconds, used for the cookie Max-Age
    pub fn max_age(&self) -> u64 {
        self.expiration.as_secs()
    }

    /// Create a signed session token for the operator
    pub fn create_token(&self, username: &str) -> Result<String> {
        let now = jsonwebtoken::get_current_timestamp();

        let claims = Claims {
            sub: username.to_string(),
            exp: now + self.expiration.as_secs(),
            iat: now,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?)
    }

    /// Validate a session token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// `Set-Cookie` value carrying a session token
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            token,
            self.max_age()
        )
    }

    /// Operator name from a valid session cookie, if any
    pub fn session_user(&self, headers: &HeaderMap) -> Option<String> {
        let token = session_token(headers)?;
        self.validate_token(token).ok().map(|claims| claims.sub)
    }
}

/// `Set-Cookie` value that clears the session
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Raw session token from the Cookie header
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let prefix = format!("{}=", SESSION_COOKIE);

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .filter(|token| !token.is_empty())
}
