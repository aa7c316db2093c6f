//! API Route Definitions
//!
//! This module defines all HTTP routes and their corresponding handlers using a
//! builder pattern. Routes fall into three tiers: public, optionally
//! authenticated (the biodata directory) and protected. Each tier gets its own
//! authentication layer before the tiers are merged.

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};

use super::biodata_handlers::*;
use super::contact_handlers::*;
use super::favourite_handlers::*;
use super::handlers::*;
use super::middleware::{auth_middleware, optional_auth_middleware};
use crate::service::IdentityProvider;

/// Builder for creating API routes with configurable endpoint groups
///
/// Only enabled groups are registered, so a deployment can expose, for
/// example, just the read-only directory.
#[derive(Default)]
pub struct RouterBuilder {
    /// GET /health
    health_check: bool,
    /// GET /success-counter
    success_counter: bool,
    /// GET /biodatas, GET /biodatas/{id}
    biodata_directory: bool,
    /// POST /biodatas, PATCH|DELETE /biodatas/{id}, GET /my-biodata
    biodata_management: bool,
    /// POST|GET /users, GET /users/{email}, PATCH /users/{email}/role|premium
    users: bool,
    /// Contact request creation, admin review and the requester's own list
    contact_requests: bool,
    /// POST|GET /favourites, DELETE /favourites/{id}
    favourites: bool,
    /// GET /admin/stats
    admin_stats: bool,
}

impl RouterBuilder {
    /// Creates a new router builder with all routes disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router builder with every endpoint enabled
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            success_counter: true,
            biodata_directory: true,
            biodata_management: true,
            users: true,
            contact_requests: true,
            favourites: true,
            admin_stats: true,
        }
    }

    /// Creates a router builder with only unauthenticated reads
    ///
    /// Health, success counter and the biodata directory. Contact details
    /// stay hidden from anonymous viewers.
    pub fn with_public_routes() -> Self {
        Self {
            health_check: true,
            success_counter: true,
            biodata_directory: true,
            ..Self::default()
        }
    }

    /// Creates a router with only the health check, for monitoring
    pub fn with_minimal_routes() -> Self {
        Self {
            health_check: true,
            ..Self::default()
        }
    }

    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    pub fn success_counter(mut self, enabled: bool) -> Self {
        self.success_counter = enabled;
        self
    }

    pub fn biodata_directory(mut self, enabled: bool) -> Self {
        self.biodata_directory = enabled;
        self
    }

    pub fn biodata_management(mut self, enabled: bool) -> Self {
        self.biodata_management = enabled;
        self
    }

    pub fn users(mut self, enabled: bool) -> Self {
        self.users = enabled;
        self
    }

    pub fn contact_requests(mut self, enabled: bool) -> Self {
        self.contact_requests = enabled;
        self
    }

    pub fn favourites(mut self, enabled: bool) -> Self {
        self.favourites = enabled;
        self
    }

    pub fn admin_stats(mut self, enabled: bool) -> Self {
        self.admin_stats = enabled;
        self
    }

    /// Whether any endpoint requiring a verified caller is enabled
    fn has_protected_routes(&self) -> bool {
        self.biodata_management
            || self.users
            || self.contact_requests
            || self.favourites
            || self.admin_stats
    }

    /// Builds the Axum router with the configured routes
    ///
    /// The identity provider backs both authentication layers. The returned
    /// router still needs `with_state(AppState)`.
    pub fn build(self, identity_provider: Arc<dyn IdentityProvider>) -> Router<AppState> {
        let mut public = Router::new();

        if self.health_check {
            public = public.route("/health", get(health_check));
        }

        if self.success_counter {
            public = public.route("/success-counter", get(success_counter));
        }

        let mut router = public;

        if self.biodata_directory {
            let directory = Router::new()
                .route("/biodatas", get(list_biodatas))
                .route("/biodatas/{id}", get(get_biodata))
                .route_layer(from_fn_with_state(
                    identity_provider.clone(),
                    optional_auth_middleware,
                ));
            router = router.merge(directory);
        }

        // route_layer panics on a router without routes
        if !self.has_protected_routes() {
            return router;
        }

        let mut protected = Router::new();

        if self.biodata_management {
            protected = protected
                .route("/biodatas", post(create_biodata))
                .route(
                    "/biodatas/{id}",
                    patch(update_biodata).delete(delete_biodata),
                )
                .route("/my-biodata", get(my_biodata));
        }

        if self.users {
            protected = protected
                .route("/users", post(create_user).get(list_users))
                .route("/users/{email}", get(get_user))
                .route("/users/{email}/role", patch(update_user_role))
                .route("/users/{email}/premium", patch(update_user_premium));
        }

        if self.contact_requests {
            protected = protected
                .route(
                    "/contact-requests",
                    post(create_contact_request).get(list_contact_requests),
                )
                .route(
                    "/contact-requests/{id}/approve",
                    patch(approve_contact_request),
                )
                .route(
                    "/contact-requests/{id}/reject",
                    patch(reject_contact_request),
                )
                .route("/my-contact-requests", get(my_contact_requests));
        }

        if self.favourites {
            protected = protected
                .route("/favourites", post(add_favourite).get(list_favourites))
                .route("/favourites/{id}", delete(remove_favourite));
        }

        if self.admin_stats {
            protected = protected.route("/admin/stats", get(admin_stats));
        }

        let protected =
            protected.route_layer(from_fn_with_state(identity_provider, auth_middleware));

        router.merge(protected)
    }
}

/// Creates all API routes
pub fn create_routes(identity_provider: Arc<dyn IdentityProvider>) -> Router<AppState> {
    RouterBuilder::with_all_routes().build(identity_provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryProfileStore;
    use crate::service::biodata::testing::StubImageStore;
    use crate::service::JwtIdentityProvider;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn identity_provider() -> Arc<dyn IdentityProvider> {
        Arc::new(JwtIdentityProvider::with_secret(b"route-secret", "route-project"))
    }

    fn app(builder: RouterBuilder) -> Router {
        let identity_provider = identity_provider();
        let state = AppState::new(
            Arc::new(MemoryProfileStore::new()),
            identity_provider.clone(),
            Arc::new(StubImageStore::default()),
            1024 * 1024,
        );
        builder.build(identity_provider).with_state(state)
    }

    async fn status_of(app: Router, method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[test]
    fn test_router_builder_new() {
        let builder = RouterBuilder::new();

        assert!(!builder.health_check);
        assert!(!builder.biodata_directory);
        assert!(!builder.has_protected_routes());
    }

    #[test]
    fn test_router_builder_with_public_routes() {
        let builder = RouterBuilder::with_public_routes();

        assert!(builder.health_check);
        assert!(builder.success_counter);
        assert!(builder.biodata_directory);
        assert!(!builder.has_protected_routes());
    }

    #[test]
    fn test_router_builder_individual_methods() {
        let builder = RouterBuilder::new()
            .health_check(true)
            .favourites(true)
            .users(false);

        assert!(builder.health_check);
        assert!(builder.favourites);
        assert!(!builder.users);
        assert!(builder.has_protected_routes());
    }

    #[test]
    fn test_builds_every_preset() {
        let _ = create_routes(identity_provider());
        let _ = RouterBuilder::with_public_routes().build(identity_provider());
        let _ = RouterBuilder::with_minimal_routes().build(identity_provider());
        let _ = RouterBuilder::new().build(identity_provider());
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = app(RouterBuilder::with_all_routes());

        for (method, uri) in [
            ("GET", "/users"),
            ("GET", "/my-biodata"),
            ("GET", "/favourites"),
            ("GET", "/my-contact-requests"),
            ("GET", "/admin/stats"),
            ("DELETE", "/biodatas/5f0c3f6e-8d7a-4c1e-9d55-2a4b5f1e7c10"),
        ] {
            assert_eq!(
                status_of(app.clone(), method, uri).await,
                StatusCode::UNAUTHORIZED,
                "{method} {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_directory_is_public() {
        let app = app(RouterBuilder::with_all_routes());

        assert_eq!(status_of(app.clone(), "GET", "/biodatas").await, StatusCode::OK);
        assert_eq!(
            status_of(app, "GET", "/success-counter").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_disabled_routes_are_not_found() {
        let app = app(RouterBuilder::with_minimal_routes());

        assert_eq!(status_of(app.clone(), "GET", "/health").await, StatusCode::OK);
        assert_eq!(
            status_of(app, "GET", "/biodatas").await,
            StatusCode::NOT_FOUND
        );
    }
}
