//! JWT access tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AuthSettings;
use crate::{Error, Result};

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// User row ID
    pub user_id: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Issues and validates HS256 access tokens
#[derive(Clone)]
pub struct TokenService {
    secret: SecretString,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from resolved auth settings
    #[must_use]
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            secret: settings.jwt_secret.clone(),
            ttl: Duration::minutes(settings.token_ttl_minutes),
        }
    }

    /// Issue a token for a user
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn issue(&self, username: &str, user_id: i64) -> Result<String> {
        let claims = Claims {
            sub: username.to_string(),
            user_id,
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| Error::Auth(format!("failed to issue token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` if the token is invalid or expired
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| Error::Auth(format!("invalid token: {e}")))?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(ttl_minutes: i64) -> TokenService {
        TokenService::new(&AuthSettings {
            jwt_secret: SecretString::from("test-secret"),
            token_ttl_minutes: ttl_minutes,
        })
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let service = service(60);

        let token = service.issue("alice", 42).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.user_id, 42);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service(-5);

        let token = service.issue("bob", 1).unwrap();
        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service(60).issue("carol", 2).unwrap();

        let other = TokenService::new(&AuthSettings {
            jwt_secret: SecretString::from("other-secret"),
            token_ttl_minutes: 60,
        });
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(service(60).validate("not.a.token").is_err());
    }
}
