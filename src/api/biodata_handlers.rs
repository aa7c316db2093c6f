//! Biodata Handlers
//!
//! Public directory reads run behind the optional authentication layer so the
//! owner and admins see contact details; writes require a verified caller.

use axum::{extract::State, Extension};

use super::extract::{BiodataSubmission, PathParam, QueryParams};
use super::handlers::{created, ok, ApiResponse, AppState, CreatedResponse};
use super::middleware::AuthUser;
use crate::models::{Biodata, BiodataListQuery, BiodataPage, DeletedResponse};

pub async fn create_biodata(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    submission: BiodataSubmission,
) -> CreatedResponse<Biodata> {
    let biodata = state
        .biodata_service
        .create(&caller, submission.input, submission.image)
        .await?;
    created(biodata)
}

pub async fn list_biodatas(
    State(state): State<AppState>,
    caller: Option<Extension<AuthUser>>,
    QueryParams(query): QueryParams<BiodataListQuery>,
) -> ApiResponse<BiodataPage> {
    let caller = caller.map(|Extension(AuthUser(identity))| identity);
    let viewer = state
        .biodata_service
        .access()
        .viewer(caller.as_ref())
        .await?;

    ok(state.biodata_service.list(&viewer, query).await?)
}

pub async fn get_biodata(
    State(state): State<AppState>,
    caller: Option<Extension<AuthUser>>,
    PathParam(id): PathParam<String>,
) -> ApiResponse<Biodata> {
    let caller = caller.map(|Extension(AuthUser(identity))| identity);
    let viewer = state
        .biodata_service
        .access()
        .viewer(caller.as_ref())
        .await?;

    ok(state.biodata_service.get(&viewer, &id).await?)
}

pub async fn update_biodata(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    PathParam(id): PathParam<String>,
    submission: BiodataSubmission,
) -> ApiResponse<Biodata> {
    ok(state
        .biodata_service
        .update(&caller, &id, submission.input, submission.image)
        .await?)
}

pub async fn delete_biodata(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    PathParam(id): PathParam<String>,
) -> ApiResponse<DeletedResponse> {
    state.biodata_service.delete(&caller, &id).await?;
    ok(DeletedResponse { deleted: true })
}

/// The caller's own biodata
pub async fn my_biodata(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
) -> ApiResponse<Biodata> {
    ok(state.biodata_service.mine(&caller).await?)
}
