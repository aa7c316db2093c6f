//! Biodata Service Library
//!
//! Backend for a matrimonial profile directory. Users publish a single
//! biodata, browse and filter the directory, keep favourites, and, once
//! premium, request another member's contact details. An admin approves or
//! rejects each contact request, manages roles and premium status, and sees
//! dashboard counts.
//!
//! # Features
//!
//! - **Bearer-token identity**: ID tokens from an external provider, verified
//!   with `jsonwebtoken`
//! - **Biodata directory**: filtering by type, division and age with paging;
//!   contact details shown only to the owner and admins
//! - **Premium gating**: effective premium resolved from the biodata, then
//!   the owning user
//! - **Contact workflow**: pending requests settled once by an admin
//! - **Pluggable storage**: PostgreSQL via SQLx, or an in-memory store for
//!   tests and local runs
//! - **Flexible Router**: endpoint groups enabled via `RouterBuilder`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use biodata_service::{
//!     api::{AppState, RouterBuilder},
//!     config::AppConfig,
//!     database::{DatabaseConfig, PgProfileStore},
//!     service::{IdentityProvider, ImgbbImageStore, JwtIdentityProvider},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let pool = DatabaseConfig::from(&config.database)
//!         .connect_and_migrate()
//!         .await?;
//!
//!     let identity: Arc<dyn IdentityProvider> =
//!         Arc::new(JwtIdentityProvider::from_config(&config.identity)?);
//!     let state = AppState::new(
//!         Arc::new(PgProfileStore::new(pool)),
//!         identity.clone(),
//!         Arc::new(ImgbbImageStore::from_config(&config.images)?),
//!         config.images.max_bytes,
//!     );
//!
//!     // Read-only directory deployment
//!     let app = RouterBuilder::with_public_routes()
//!         .build(identity)
//!         .with_state(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **API Layer**: handlers, extractors, middleware and route definitions
//! - **Service Layer**: business rules and access decisions
//! - **Models**: records and request/response payloads
//! - **Database**: the `ProfileStore` port and its implementations
//! - **Utils**: validation and error handling

/// HTTP API layer with handlers and configurable routing
pub mod api;

/// Environment-driven configuration
pub mod config;

/// Profile store port, PostgreSQL and in-memory implementations
pub mod database;

/// Data models and request/response structures
pub mod models;

/// Business logic, access policy and external clients
pub mod service;

/// Shared utilities for validation and error handling
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, RouterBuilder};
pub use config::{AppConfig, ConfigError};
pub use database::{DatabaseConfig, MemoryProfileStore, PgProfileStore, ProfileStore};
pub use models::{
    Biodata, BiodataInput, BiodataType, ContactRequest, ContactStatus, Favourite, Identity, Role,
    User,
};
pub use service::{
    BiodataService, ContactRequestService, FavouriteService, IdentityProvider, ImageStore,
    UserService,
};
pub use utils::error::{AppError, AppResult, ErrorResponse};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
