//! Authentication Middleware
//!
//! Bearer-token verification for API endpoints.

use crate::models::Identity;
use crate::service::IdentityProvider;
use crate::utils::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

#[cfg(test)]
use axum::http::StatusCode;

/// Extension type for storing the verified caller in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".into()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Authentication("Invalid Authorization header format".into()))
}

/// Authentication middleware that verifies the bearer token
///
/// On success the caller's [`Identity`] is inserted as an [`AuthUser`]
/// extension; otherwise the request is answered with 401.
pub async fn auth_middleware(
    State(identity_provider): State<Arc<dyn IdentityProvider>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&headers)?;

    let identity = identity_provider.verify(token).await.map_err(|e| {
        log::debug!("Rejected bearer token: {}", e);
        AppError::Authentication("Invalid or expired token".into())
    })?;

    request.extensions_mut().insert(AuthUser(identity));
    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Inserts the caller when a valid token is present and carries on
/// anonymously otherwise. Used by the public biodata reads, which show
/// contact details to owners and admins.
pub async fn optional_auth_middleware(
    State(identity_provider): State<Arc<dyn IdentityProvider>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(token) = bearer_token(&headers) {
        if let Ok(identity) = identity_provider.verify(token).await {
            request.extensions_mut().insert(AuthUser(identity));
        }
    }

    next.run(request).await
}
