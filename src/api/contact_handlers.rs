//! Contact Request Handlers

use axum::{extract::State, Extension};

use super::extract::{JsonBody, PathParam, QueryParams};
use super::handlers::{created, ok, ApiResponse, AppState, CreatedResponse};
use super::middleware::AuthUser;
use crate::models::{
    ContactRequest, ContactRequestDetails, ContactRequestQuery, CreateContactRequest,
    MyContactRequest,
};

pub async fn create_contact_request(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    JsonBody(request): JsonBody<CreateContactRequest>,
) -> CreatedResponse<ContactRequest> {
    created(
        state
            .contact_request_service
            .create(&caller, request)
            .await?,
    )
}

/// All contact requests, optionally filtered by `?status=` (admin)
pub async fn list_contact_requests(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    QueryParams(query): QueryParams<ContactRequestQuery>,
) -> ApiResponse<Vec<ContactRequestDetails>> {
    ok(state
        .contact_request_service
        .list_for_admin(&caller, query)
        .await?)
}

pub async fn approve_contact_request(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    PathParam(id): PathParam<String>,
) -> ApiResponse<ContactRequest> {
    ok(state.contact_request_service.approve(&caller, &id).await?)
}

pub async fn reject_contact_request(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    PathParam(id): PathParam<String>,
) -> ApiResponse<ContactRequest> {
    ok(state.contact_request_service.reject(&caller, &id).await?)
}

pub async fn my_contact_requests(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
) -> ApiResponse<Vec<MyContactRequest>> {
    ok(state.contact_request_service.list_mine(&caller).await?)
}
