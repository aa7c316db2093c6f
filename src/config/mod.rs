//! Configuration Module
//!
//! Environment-driven settings for the HTTP server, database, identity
//! provider and image host.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Environment variable helpers
pub mod env {
    use super::ConfigError;
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as usize with default
    pub fn get_usize(key: &str, default: usize) -> usize {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a required, non-blank environment variable
    pub fn require(key: &'static str) -> Result<String, ConfigError> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::Missing(key)),
        }
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub images: ImageConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_request_size: usize,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

/// Identity provider token verification settings
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Expected token audience; the issuer is derived from it
    pub project_id: String,
    /// PEM public key, or the shared secret for HMAC algorithms
    pub verification_key: String,
    pub algorithm: String,
}

/// Image host settings
#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub api_key: String,
    pub upload_url: String,
    pub upload_timeout_seconds: u64,
    pub max_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_u16("SERVER_PORT", 5000),
            cors_origins: env::get_string("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            max_request_size: env::get_usize("MAX_REQUEST_SIZE", 8 * 1024 * 1024), // 8MB
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::require("DATABASE_URL")?,
            max_connections: env::get_u32("DB_MAX_CONNECTIONS", 10),
            min_connections: env::get_u32("DB_MIN_CONNECTIONS", 1),
            connect_timeout_seconds: env::get_u64("DB_CONNECT_TIMEOUT", 10),
            idle_timeout_seconds: env::get_u64("DB_IDLE_TIMEOUT", 600),
            max_lifetime_seconds: env::get_u64("DB_MAX_LIFETIME", 3600),
        })
    }
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_id: env::require("IDP_PROJECT_ID")?,
            verification_key: env::require("IDP_VERIFICATION_KEY")?.replace("\\n", "\n"),
            algorithm: env::get_string("IDP_ALGORITHM", "RS256"),
        })
    }
}

impl ImageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env::require("IMAGE_HOST_API_KEY")?,
            upload_url: env::get_string("IMAGE_HOST_UPLOAD_URL", "https://api.imgbb.com/1/upload"),
            upload_timeout_seconds: env::get_u64("IMAGE_UPLOAD_TIMEOUT_SECONDS", 30),
            max_bytes: env::get_usize("IMAGE_MAX_BYTES", 5 * 1024 * 1024), // 5MB
        })
    }
}

impl AppConfig {
    /// Load complete application configuration from environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
            images: ImageConfig::from_env()?,
        })
    }

    /// Validate the complete configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid(
                "Server port must be greater than 0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "Database min_connections cannot be greater than max_connections".into(),
            ));
        }

        if self.images.max_bytes == 0 {
            return Err(ConfigError::Invalid(
                "IMAGE_MAX_BYTES must be greater than 0".into(),
            ));
        }

        // Images travel inside the request body
        if self.images.max_bytes > self.server.max_request_size {
            return Err(ConfigError::Invalid(
                "IMAGE_MAX_BYTES cannot exceed MAX_REQUEST_SIZE".into(),
            ));
        }

        Ok(())
    }
}
