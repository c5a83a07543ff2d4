//! JWT issuance and verification

use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::ShopragError;
use crate::models::User;

/// Claims carried by each access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration (unix timestamp)
    pub exp: i64,
}

/// Signs and verifies access tokens
///
/// Holds the key material; share via `Arc` rather than re-deriving keys
/// per request.
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_minutes: i64,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, expiry_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_minutes,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.jwt_secret(), config.token_expiry_minutes() as i64)
    }

    /// Issue an access token for the user
    ///
    /// # Errors
    /// - `AuthError` (token encoding failed)
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.expiry_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ShopragError::AuthError(format!("Failed to encode token: {e}")))
    }

    /// Verify a token signature and expiry, returning its claims
    ///
    /// # Errors
    /// - `AuthError` (expired, malformed, or wrongly signed token)
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                ShopragError::AuthError("Invalid token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: Some("Alice".to_string()),
            role: "user".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_and_verify() {
        let service = JwtService::new("test-secret", 30);
        let user = sample_user();

        let token = service.generate_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new("secret-a", 30);
        let verifier = JwtService::new("secret-b", 30);

        let token = issuer.generate_token(&sample_user()).unwrap();

        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issued already past expiry, beyond the default 60s leeway
        let service = JwtService::new("test-secret", -5);

        let token = service.generate_token(&sample_user()).unwrap();

        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = JwtService::new("test-secret", 30);
        let token = service.generate_token(&sample_user()).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');

        assert!(service.verify_token(&tampered).is_err());
    }
}
