//! Favourite Handlers

use axum::{extract::State, Extension};

use super::extract::{JsonBody, PathParam, QueryParams};
use super::handlers::{created, ok, ApiResponse, AppState, CreatedResponse};
use super::middleware::AuthUser;
use crate::models::{
    AddFavouriteRequest, DeletedResponse, Favourite, FavouriteWithBiodata, FavouritesQuery,
};

pub async fn add_favourite(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    JsonBody(request): JsonBody<AddFavouriteRequest>,
) -> CreatedResponse<Favourite> {
    created(state.favourite_service.add(&caller, request).await?)
}

pub async fn list_favourites(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    QueryParams(query): QueryParams<FavouritesQuery>,
) -> ApiResponse<Vec<FavouriteWithBiodata>> {
    ok(state.favourite_service.list(&caller, query).await?)
}

pub async fn remove_favourite(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    PathParam(id): PathParam<String>,
) -> ApiResponse<DeletedResponse> {
    state.favourite_service.remove(&caller, &id).await?;
    ok(DeletedResponse { deleted: true })
}
