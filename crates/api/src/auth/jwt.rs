//! Identity-provider token validation.
//!
//! Authentication itself is external: callers arrive with an HS256 JWT
//! issued by the identity provider, which shares a secret with this
//! service. The gateway only verifies signature and expiry and extracts
//! the caller's stable id and display name; it never registers users or
//! stores credentials.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tagalong_core::types::UserId;

/// Claims the identity provider embeds in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's stable id at the identity provider.
    pub sub: UserId,
    /// The user's display name, shown to other lobby members.
    pub name: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity provider.
    pub secret: String,
}

impl JwtConfig {
    /// Load JWT configuration from the `JWT_SECRET` environment variable.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self { secret }
    }
}

/// Validate a token and return its claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, exp checked
    )?;
    Ok(data.claims)
}

/// Mint a token the way the identity provider would.
///
/// Used by integration tests and local development. Production tokens
/// come from the identity provider itself.
pub fn issue_token(
    user_id: UserId,
    name: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        name: name.to_string(),
        exp: now + 3600,
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}
