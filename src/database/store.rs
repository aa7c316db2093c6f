//! Profile Store Port
//!
//! Persistence operations the services need. Implementations must enforce
//! the uniqueness rules atomically: inserting a duplicate returns `Ok(None)`
//! instead of a second record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::connection::Pagination;
use crate::models::{
    Biodata, BiodataFilter, ContactRequest, ContactStatus, DashboardStats, Favourite,
    NewBiodata, NewUser, Role, User,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be mapped back onto the model
    #[error("Corrupt record in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users, biodatas, contact requests, favourites and
/// success counters. All emails passed in are already normalized.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Connectivity check
    async fn ping(&self) -> StoreResult<()>;

    // Users

    /// Inserts a user; `None` if the email is taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<Option<User>>;

    async fn find_user(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn set_user_role(&self, email: &str, role: Role) -> StoreResult<Option<User>>;

    async fn set_user_premium(&self, email: &str, is_premium: bool) -> StoreResult<Option<User>>;

    /// Writes the premium flag, creating a bare user record when none exists
    async fn upsert_user_premium(&self, email: &str, is_premium: bool) -> StoreResult<User>;

    // Biodatas

    /// Inserts a biodata; `None` if the owner already has one
    async fn insert_biodata(&self, biodata: NewBiodata) -> StoreResult<Option<Biodata>>;

    async fn find_biodata(&self, id: Uuid) -> StoreResult<Option<Biodata>>;

    async fn find_biodata_by_email(&self, email: &str) -> StoreResult<Option<Biodata>>;

    /// Matching biodatas in creation order, plus the total match count
    async fn list_biodatas(
        &self,
        filter: &BiodataFilter,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<Biodata>, i64)>;

    /// Replaces the profile and premium flag of an existing biodata
    async fn replace_biodata(&self, biodata: &Biodata) -> StoreResult<Option<Biodata>>;

    /// Writes the premium flag onto the biodata owned by `email`; returns rows touched
    async fn set_biodata_premium(&self, email: &str, is_premium: bool) -> StoreResult<u64>;

    async fn delete_biodata(&self, id: Uuid) -> StoreResult<bool>;

    // Contact requests

    /// Inserts a pending request; `None` if the pair already has one in any state
    async fn insert_contact_request(
        &self,
        requester_email: &str,
        biodata_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Option<ContactRequest>>;

    async fn find_contact_request(&self, id: Uuid) -> StoreResult<Option<ContactRequest>>;

    /// All requests in creation order, optionally filtered by status
    async fn list_contact_requests(
        &self,
        status: Option<ContactStatus>,
    ) -> StoreResult<Vec<ContactRequest>>;

    /// A requester's own requests, newest first
    async fn list_contact_requests_by_requester(
        &self,
        requester_email: &str,
    ) -> StoreResult<Vec<ContactRequest>>;

    /// Moves a request out of `pending` and stamps the matching timestamp.
    /// `None` when the request does not exist or is no longer pending.
    async fn resolve_contact_request(
        &self,
        id: Uuid,
        status: ContactStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ContactRequest>>;

    // Favourites

    /// Inserts a favourite; `None` if the pair already exists
    async fn insert_favourite(
        &self,
        user_email: &str,
        biodata_id: Uuid,
        added_at: DateTime<Utc>,
    ) -> StoreResult<Option<Favourite>>;

    async fn list_favourites(&self, user_email: &str) -> StoreResult<Vec<Favourite>>;

    /// Deletes a favourite only if it belongs to `user_email`
    async fn delete_favourite(&self, id: Uuid, user_email: &str) -> StoreResult<bool>;

    // Read-only collections

    async fn list_success_counters(&self) -> StoreResult<Vec<serde_json::Value>>;

    async fn dashboard_stats(&self) -> StoreResult<DashboardStats>;
}
