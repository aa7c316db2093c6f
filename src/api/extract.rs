//! Request Extractors
//!
//! Wrappers around the axum extractors that reject with [`AppError`], so
//! malformed input gets the same JSON error body as every other failure.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;

use crate::models::BiodataInput;
use crate::service::ImageUpload;
use crate::utils::error::AppError;

/// Multipart field carrying the profile image
pub const PROFILE_IMAGE_FIELD: &str = "profileImage";

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// JSON body for payloads whose fields are all optional: an empty body
/// yields `T::default()`
#[derive(Debug)]
pub struct JsonOrDefault<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrDefault<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

/// Biodata fields plus an optional profile image, accepted either as
/// `multipart/form-data` or as a JSON body (no image)
#[derive(Debug)]
pub struct BiodataSubmission {
    pub input: BiodataInput,
    pub image: Option<ImageUpload>,
}

impl<S> FromRequest<S> for BiodataSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(input) = Json::<BiodataInput>::from_request(req, state).await?;
            return Ok(Self { input, image: None });
        }

        let mut multipart = Multipart::from_request(req, state).await?;

        let mut input = BiodataInput::default();
        let mut image = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == PROFILE_IMAGE_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                // Browsers send an empty part for an untouched file input
                if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                    continue;
                }

                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field.text().await?;
                if value.trim().is_empty() {
                    continue;
                }
                input.set_field(&name, value)?;
            }
        }

        Ok(Self { input, image })
    }
}
