//! Identity Provider Client
//!
//! Verifies ID tokens issued by the external identity provider and turns
//! them into a caller [`Identity`].

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::str::FromStr;
use thiserror::Error;

use crate::config::IdentityConfig;
use crate::models::{IdTokenClaims, Identity, ISSUER_PREFIX};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token carries no email address")]
    MissingEmail,

    #[error("Invalid verification key: {0}")]
    InvalidKey(String),
}

/// Verifies bearer tokens
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// JWT verification against the provider's signing key, audience and issuer
#[derive(Clone)]
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(decoding_key: DecodingKey, algorithm: Algorithm, project_id: &str) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("{}{}", ISSUER_PREFIX, project_id)]);

        Self {
            decoding_key,
            validation,
        }
    }

    /// HMAC-signed tokens, used by tests and local development
    pub fn with_secret(secret: &[u8], project_id: &str) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256, project_id)
    }

    /// Builds the verifier from configuration. RSA and EC algorithms expect a
    /// PEM public key; HMAC algorithms use the key text as the shared secret.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|e| IdentityError::InvalidKey(format!("{}: {}", config.algorithm, e)))?;
        let key = config.verification_key.as_bytes();

        let decoding_key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => DecodingKey::from_secret(key),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(key)
                .map_err(|e| IdentityError::InvalidKey(e.to_string()))?,
            Algorithm::EdDSA => DecodingKey::from_ed_pem(key)
                .map_err(|e| IdentityError::InvalidKey(e.to_string()))?,
            _ => DecodingKey::from_rsa_pem(key)
                .map_err(|e| IdentityError::InvalidKey(e.to_string()))?,
        };

        Ok(Self::new(decoding_key, algorithm, &config.project_id))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let claims = decode::<IdTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        match claims.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Ok(Identity::new(email, &claims.sub)),
            _ => Err(IdentityError::MissingEmail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-signing-secret";

    fn sign(claims: &IdTokenClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn claims_for(project: &str, email: &str) -> IdTokenClaims {
        let now = Utc::now();
        IdTokenClaims::new("uid-1", email, project, now, now + Duration::hours(1))
    }

    #[tokio::test]
    async fn test_valid_token_yields_normalized_identity() {
        let provider = JwtIdentityProvider::with_secret(SECRET, "matrimony");
        let token = sign(&claims_for("matrimony", "Alice@Example.com"));

        let identity = provider.verify(&token).await.unwrap();
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.uid, "uid-1");
    }

    #[tokio::test]
    async fn test_wrong_audience_is_rejected() {
        let provider = JwtIdentityProvider::with_secret(SECRET, "matrimony");
        let token = sign(&claims_for("other-project", "alice@example.com"));

        assert!(matches!(
            provider.verify(&token).await,
            Err(IdentityError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let provider = JwtIdentityProvider::with_secret(SECRET, "matrimony");
        let issued = Utc::now() - Duration::hours(3);
        let claims = IdTokenClaims::new(
            "uid-1",
            "alice@example.com",
            "matrimony",
            issued,
            issued + Duration::hours(1),
        );

        assert!(provider.verify(&sign(&claims)).await.is_err());
    }

    #[tokio::test]
    async fn test_token_without_email_is_rejected() {
        let provider = JwtIdentityProvider::with_secret(SECRET, "matrimony");
        let mut claims = claims_for("matrimony", "alice@example.com");
        claims.email = None;

        assert!(matches!(
            provider.verify(&sign(&claims)).await,
            Err(IdentityError::MissingEmail)
        ));
    }

    #[test]
    fn test_from_config_rejects_unknown_algorithm() {
        let config = IdentityConfig {
            project_id: "matrimony".into(),
            verification_key: "secret".into(),
            algorithm: "XX999".into(),
        };
        assert!(JwtIdentityProvider::from_config(&config).is_err());
    }
}
