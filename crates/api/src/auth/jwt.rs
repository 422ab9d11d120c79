//! Access and refresh tokens.
//!
//! Access tokens are HS256 JWTs issued by `coursely-api` and carrying the
//! caller's role, so RBAC checks need no database round trip. Refresh
//! tokens are opaque; the `sessions` table stores only their SHA-256 hash.

use chrono::Utc;
use coursely_core::roles::Role;
use coursely_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// `iss` of every token this service mints.
pub const TOKEN_ISSUER: &str = "coursely-api";

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// A token naming a role outside [`Role`] fails to decode.
    pub role: Role,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                    | Default  |
    /// |----------------------------|----------|
    /// | `JWT_SECRET`               | required |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `15`     |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | `7`      |
    ///
    /// # Panics
    ///
    /// On a missing or empty `JWT_SECRET`, or a lifetime that is not a
    /// positive integer. Startup should fail loudly rather than mint tokens
    /// with a weak configuration.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set and non-empty");

        Self {
            secret,
            access_token_expiry_mins: lifetime("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
            refresh_token_expiry_days: lifetime(
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            ),
        }
    }
}

fn lifetime(var: &str, default: i64) -> i64 {
    let value = std::env::var(var)
        .ok()
        .map(|raw| raw.trim().parse::<i64>())
        .unwrap_or(Ok(default))
        .unwrap_or_else(|_| panic!("{var} must be an integer"));
    assert!(value > 0, "{var} must be positive");
    value
}

/// Mint an access token for `user_id` acting as `role`.
pub fn generate_access_token(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        iss: TOKEN_ISSUER.to_string(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and issuer, then decode the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// A fresh refresh token as `(plaintext, sha256_hex)`. Only the plaintext
/// leaves the server.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
