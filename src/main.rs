//! Biodata Service Server
//!
//! Loads configuration from the environment, connects to PostgreSQL (running
//! pending migrations), wires the identity and image clients and serves every
//! API endpoint.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, http::HeaderValue};
use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use biodata_service::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    database::{DatabaseConfig, PgProfileStore},
    service::{IdentityProvider, ImgbbImageStore, JwtIdentityProvider},
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();
    env_logger::init();

    log::info!("Starting Biodata Service v{}", biodata_service::VERSION);

    let config = AppConfig::from_env()?;
    config.validate()?;

    log::info!("Configuration loaded and validated");

    let db_config = DatabaseConfig::from(&config.database);
    let database_pool = db_config.connect_and_migrate().await?;

    log::info!("Database connected and migrations applied");

    let store = Arc::new(PgProfileStore::new(database_pool));
    let identity_provider: Arc<dyn IdentityProvider> =
        Arc::new(JwtIdentityProvider::from_config(&config.identity)?);
    let images = Arc::new(ImgbbImageStore::from_config(&config.images)?);

    log::info!(
        "Identity tokens verified for project '{}' ({})",
        config.identity.project_id,
        config.identity.algorithm
    );

    let app_state = AppState::new(
        store,
        identity_provider.clone(),
        images,
        config.images.max_bytes,
    );

    let app = RouterBuilder::with_all_routes()
        .build(identity_provider)
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.server.cors_origins))
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .into_inner(),
        );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("Listening on {}", bind_addr);

    log::info!("API Endpoints:");
    log::info!("   GET    /health                          - Health check");
    log::info!("   GET    /success-counter                 - Success stories");
    log::info!("   GET    /biodatas                        - Browse biodatas (filters, paging)");
    log::info!("   GET    /biodatas/{{id}}                   - Biodata details");
    log::info!("   POST   /biodatas                        - Create own biodata (multipart)");
    log::info!("   PATCH  /biodatas/{{id}}                   - Update biodata (owner or admin)");
    log::info!("   DELETE /biodatas/{{id}}                   - Delete biodata (admin)");
    log::info!("   GET    /my-biodata                      - Caller's biodata");
    log::info!("   POST   /users                           - Register user");
    log::info!("   GET    /users                           - List users (admin)");
    log::info!("   GET    /users/{{email}}                   - User details");
    log::info!("   PATCH  /users/{{email}}/role              - Change role (admin)");
    log::info!("   PATCH  /users/{{email}}/premium           - Change premium (admin)");
    log::info!("   POST   /contact-requests                - Request contact details (premium)");
    log::info!("   GET    /contact-requests                - Review requests (admin)");
    log::info!("   PATCH  /contact-requests/{{id}}/approve   - Approve (admin)");
    log::info!("   PATCH  /contact-requests/{{id}}/reject    - Reject (admin)");
    log::info!("   GET    /my-contact-requests             - Caller's requests");
    log::info!("   POST   /favourites                      - Add favourite");
    log::info!("   GET    /favourites                      - List favourites");
    log::info!("   DELETE /favourites/{{id}}                 - Remove favourite");
    log::info!("   GET    /admin/stats                     - Dashboard counts (admin)");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
