use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Session;
use crate::{CoreError, CoreResult};

pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing material plus the lifetime stamped into new tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_seconds: u64) -> CoreResult<Self> {
        if secret.is_empty() {
            return Err(CoreError::Validation("JWT secret must not be empty".to_string()));
        }
        let ttl_seconds = i64::try_from(ttl_seconds)
            .map_err(|_| CoreError::Validation("JWT expiration is out of range".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_seconds),
        })
    }

    pub fn issue(&self, user_id: Uuid) -> CoreResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> CoreResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CoreError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Signature and expiry are the whole check; there is no session table.
    pub fn verify(&self, token: &str) -> CoreResult<Session> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            CoreError::Unauthorized("Not authorized, token failed".to_string())
        })?;
        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| CoreError::Unauthorized("Not authorized, token failed".to_string()))?;
        Ok(Session { user_id })
    }
}
