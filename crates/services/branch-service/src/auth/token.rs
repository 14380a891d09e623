//! JWT access tokens and opaque refresh tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::{AppError, AppResult, JwtConfig};
use domain::Auth;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: String,
    pub iat: i64,
    pub exp: i64,
}

/// Access token plus refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Signs and verifies HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct TokenUtil {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiration_minutes: i64,
}

impl TokenUtil {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            expiration_minutes: config.expiration_minutes,
        }
    }

    /// Signed access token for `uid`.
    pub fn create_access_token(&self, uid: &str) -> AppResult<String> {
        if uid.trim().is_empty() {
            return Err(AppError::validation("uid must not be empty"));
        }
        let now = Utc::now();
        let claims = Claims {
            uid: uid.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.expiration_minutes)).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Random opaque refresh token. It carries no claims.
    pub fn create_refresh_token(&self) -> String {
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    }

    pub fn create_token_pair(&self, uid: &str) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.create_access_token(uid)?,
            refresh_token: self.create_refresh_token(),
            expires_in: self.expiration_minutes * 60,
        })
    }

    /// Verify signature and expiry and return the principal.
    pub fn parse_token(&self, token: &str) -> AppResult<Auth> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?
            .claims;
        Ok(Auth::new(claims.uid))
    }
}
