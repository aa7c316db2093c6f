//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::Role;
use crate::utils::validation::{email_validator, name_validator, url_validator};

/// Request payload for creating a user record.
///
/// `email` defaults to the caller's own; only admins may name another email.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: Option<String>,

    #[validate(custom(function = "name_validator"))]
    pub name: Option<String>,

    #[serde(rename = "photoURL")]
    #[validate(custom(function = "url_validator"))]
    pub photo_url: Option<String>,
}

/// Request payload for changing a user's role
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Request payload for granting or revoking premium
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePremiumRequest {
    pub is_premium: bool,
}

/// Request payload for sending a contact request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    #[serde(alias = "requestedBiodataId", alias = "biodata_id")]
    #[validate(length(min = 1, message = "biodataId is required"))]
    pub biodata_id: String,
}

/// Query for the admin contact request listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequestQuery {
    pub status: Option<String>,
}

/// Request payload for adding a favourite
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddFavouriteRequest {
    #[serde(alias = "biodataId")]
    #[validate(length(min = 1, message = "biodata_id is required"))]
    pub biodata_id: String,
}

/// Query for listing favourites
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavouritesQuery {
    pub email: Option<String>,
}

/// Query for the public biodata directory
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataListQuery {
    pub biodata_type: Option<String>,
    pub permanent_division: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Response for deletions
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_biodatas: i64,
    pub male_biodatas: i64,
    pub female_biodatas: i64,
    pub premium_biodatas: i64,
    pub pending_contact_requests: i64,
    pub approved_contact_requests: i64,
    pub rejected_contact_requests: i64,
}
