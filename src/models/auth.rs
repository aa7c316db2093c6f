//! Authentication Models
//!
//! ID-token claims issued by the identity provider and the verified caller
//! identity derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::validation::normalize_email;

/// Issuer prefix used by the identity provider; the project id is appended
pub const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Claims carried by an identity-provider ID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject - the provider's user id
    pub sub: String,

    /// Account email
    pub email: Option<String>,

    /// Audience - the project id
    pub aud: String,

    /// Issuer
    pub iss: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl IdTokenClaims {
    /// Create claims for a project, mainly for signing test tokens
    pub fn new(
        uid: &str,
        email: &str,
        project_id: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: uid.to_string(),
            email: Some(email.to_string()),
            aud: project_id.to_string(),
            iss: format!("{}{}", ISSUER_PREFIX, project_id),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        }
    }
}

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Lower-cased email
    pub email: String,

    /// Identity provider user id
    pub uid: String,
}

impl Identity {
    pub fn new(email: &str, uid: &str) -> Self {
        Self {
            email: normalize_email(email),
            uid: uid.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_normalizes_email() {
        let identity = Identity::new(" Alice@Example.COM ", "uid-1");
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.uid, "uid-1");
    }

    #[test]
    fn test_claims_creation() {
        let now = Utc::now();
        let claims = IdTokenClaims::new(
            "uid-1",
            "alice@example.com",
            "matrimony-prod",
            now,
            now + chrono::Duration::hours(1),
        );

        assert_eq!(claims.iss, "https://securetoken.google.com/matrimony-prod");
        assert_eq!(claims.aud, "matrimony-prod");
        assert_eq!(claims.exp - claims.iat, 3600);
    }
}
