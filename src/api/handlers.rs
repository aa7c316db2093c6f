//! HTTP Request Handlers
//!
//! Application state, the response envelope, and the user, health and
//! dashboard handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use super::extract::{JsonBody, JsonOrDefault, PathParam};
use super::middleware::AuthUser;
use crate::{
    database::ProfileStore,
    models::{requests::*, user::User},
    service::{
        BiodataService, ContactRequestService, FavouriteService, IdentityProvider, ImageStore,
        UserService,
    },
    utils::error::AppResult,
    VERSION,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub user_service: Arc<UserService>,
    pub biodata_service: Arc<BiodataService>,
    pub contact_request_service: Arc<ContactRequestService>,
    pub favourite_service: Arc<FavouriteService>,
}

impl AppState {
    /// Wires every service onto one store handle
    pub fn new(
        store: Arc<dyn ProfileStore>,
        identity_provider: Arc<dyn IdentityProvider>,
        images: Arc<dyn ImageStore>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(store.clone())),
            biodata_service: Arc::new(BiodataService::new(
                store.clone(),
                images,
                max_image_bytes,
            )),
            contact_request_service: Arc::new(ContactRequestService::new(store.clone())),
            favourite_service: Arc::new(FavouriteService::new(store.clone())),
            identity_provider,
            store,
        }
    }
}

/// Standard success response wrapper
#[derive(serde::Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

pub type ApiResponse<T> = AppResult<Json<SuccessResponse<T>>>;
pub type CreatedResponse<T> = AppResult<(StatusCode, Json<SuccessResponse<T>>)>;

pub(crate) fn ok<T>(data: T) -> ApiResponse<T> {
    Ok(Json(SuccessResponse::new(data)))
}

pub(crate) fn created<T>(data: T) -> CreatedResponse<T> {
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(data))))
}

/// Create the caller's user record
pub async fn create_user(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    JsonOrDefault(request): JsonOrDefault<CreateUserRequest>,
) -> CreatedResponse<User> {
    let user = state.user_service.create_user(&caller, request).await?;
    created(user)
}

/// List all users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
) -> ApiResponse<Vec<User>> {
    ok(state.user_service.list_users(&caller).await?)
}

/// Get user by email
pub async fn get_user(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    PathParam(email): PathParam<String>,
) -> ApiResponse<User> {
    ok(state.user_service.get_user(&caller, &email).await?)
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    PathParam(email): PathParam<String>,
    JsonBody(request): JsonBody<UpdateRoleRequest>,
) -> ApiResponse<User> {
    ok(state
        .user_service
        .set_role(&caller, &email, request.role)
        .await?)
}

pub async fn update_user_premium(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    PathParam(email): PathParam<String>,
    JsonBody(request): JsonBody<UpdatePremiumRequest>,
) -> ApiResponse<User> {
    ok(state
        .user_service
        .set_premium(&caller, &email, request.is_premium)
        .await?)
}

/// Admin dashboard counts
pub async fn admin_stats(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
) -> ApiResponse<DashboardStats> {
    ok(state.biodata_service.dashboard_stats(&caller).await?)
}

/// Success counter documents, returned verbatim
pub async fn success_counter(
    State(state): State<AppState>,
) -> ApiResponse<Vec<serde_json::Value>> {
    ok(state.biodata_service.success_counters().await?)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthCheckResponse> {
    // Check store connectivity
    state.store.ping().await?;

    ok(HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
    })
}
