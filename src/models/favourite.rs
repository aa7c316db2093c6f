//! Favourite Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::biodata::Biodata;

/// A biodata bookmarked by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favourite {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userEmail")]
    pub user_email: String,
    pub biodata_id: Uuid,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

/// Favourite joined with its biodata; `None` when the biodata was deleted
#[derive(Debug, Clone, Serialize)]
pub struct FavouriteWithBiodata {
    #[serde(flatten)]
    pub favourite: Favourite,
    pub biodata: Option<Biodata>,
}
