//! In-Memory Profile Store
//!
//! [`ProfileStore`] kept in process memory. Used by the test suites and for
//! running the API without a database. Every check-and-insert happens under
//! one write lock, so the uniqueness rules hold under concurrent requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::connection::Pagination;
use super::store::{ProfileStore, StoreResult};
use crate::models::{
    Biodata, BiodataFilter, BiodataType, ContactRequest, ContactStatus, DashboardStats,
    Favourite, NewBiodata, NewUser, Role, User,
};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    biodatas: Vec<Biodata>,
    contact_requests: Vec<ContactRequest>,
    favourites: Vec<Favourite>,
    success_counters: Vec<serde_json::Value>,
}

#[derive(Default)]
pub struct MemoryProfileStore {
    inner: RwLock<Collections>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with success counter documents
    pub fn with_success_counters(documents: Vec<serde_json::Value>) -> Self {
        Self {
            inner: RwLock::new(Collections {
                success_counters: documents,
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            uid: user.uid,
            name: user.name,
            photo_url: user.photo_url,
            role: Role::User,
            is_premium: false,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(record.clone());
        Ok(Some(record))
    }

    async fn find_user(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn set_user_role(&self, email: &str, role: Role) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.iter_mut().find(|u| u.email == email).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_user_premium(&self, email: &str, is_premium: bool) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.iter_mut().find(|u| u.email == email).map(|user| {
            user.is_premium = is_premium;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upsert_user_premium(&self, email: &str, is_premium: bool) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        if let Some(user) = inner.users.iter_mut().find(|u| u.email == email) {
            user.is_premium = is_premium;
            user.updated_at = now;
            return Ok(user.clone());
        }

        let record = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            uid: None,
            name: None,
            photo_url: None,
            role: Role::User,
            is_premium,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(record.clone());
        Ok(record)
    }

    async fn insert_biodata(&self, biodata: NewBiodata) -> StoreResult<Option<Biodata>> {
        let mut inner = self.inner.write().await;
        if inner.biodatas.iter().any(|b| b.email == biodata.email) {
            return Ok(None);
        }

        let now = Utc::now();
        let record = Biodata {
            id: Uuid::new_v4(),
            email: biodata.email,
            profile: biodata.profile,
            is_premium: Some(biodata.is_premium),
            created_at: now,
            updated_at: now,
        };
        inner.biodatas.push(record.clone());
        Ok(Some(record))
    }

    async fn find_biodata(&self, id: Uuid) -> StoreResult<Option<Biodata>> {
        let inner = self.inner.read().await;
        Ok(inner.biodatas.iter().find(|b| b.id == id).cloned())
    }

    async fn find_biodata_by_email(&self, email: &str) -> StoreResult<Option<Biodata>> {
        let inner = self.inner.read().await;
        Ok(inner.biodatas.iter().find(|b| b.email == email).cloned())
    }

    async fn list_biodatas(
        &self,
        filter: &BiodataFilter,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<Biodata>, i64)> {
        let inner = self.inner.read().await;
        let matching: Vec<&Biodata> = inner.biodatas.iter().filter(|b| filter.matches(b)).collect();
        let total = matching.len() as i64;

        let items = matching
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn replace_biodata(&self, biodata: &Biodata) -> StoreResult<Option<Biodata>> {
        let mut inner = self.inner.write().await;
        Ok(inner.biodatas.iter_mut().find(|b| b.id == biodata.id).map(|stored| {
            stored.profile = biodata.profile.clone();
            stored.is_premium = biodata.is_premium;
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn set_biodata_premium(&self, email: &str, is_premium: bool) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let mut touched = 0;
        for biodata in inner.biodatas.iter_mut().filter(|b| b.email == email) {
            biodata.is_premium = Some(is_premium);
            biodata.updated_at = Utc::now();
            touched += 1;
        }
        Ok(touched)
    }

    async fn delete_biodata(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.biodatas.len();
        inner.biodatas.retain(|b| b.id != id);
        Ok(inner.biodatas.len() < before)
    }

    async fn insert_contact_request(
        &self,
        requester_email: &str,
        biodata_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Option<ContactRequest>> {
        let mut inner = self.inner.write().await;
        if inner
            .contact_requests
            .iter()
            .any(|r| r.requester_email == requester_email && r.requested_biodata_id == biodata_id)
        {
            return Ok(None);
        }

        let record = ContactRequest {
            id: Uuid::new_v4(),
            requester_email: requester_email.to_string(),
            requested_biodata_id: biodata_id,
            status: ContactStatus::Pending,
            created_at,
            approved_at: None,
            rejected_at: None,
        };
        inner.contact_requests.push(record.clone());
        Ok(Some(record))
    }

    async fn find_contact_request(&self, id: Uuid) -> StoreResult<Option<ContactRequest>> {
        let inner = self.inner.read().await;
        Ok(inner.contact_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_contact_requests(
        &self,
        status: Option<ContactStatus>,
    ) -> StoreResult<Vec<ContactRequest>> {
        let inner = self.inner.read().await;
        Ok(inner
            .contact_requests
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    async fn list_contact_requests_by_requester(
        &self,
        requester_email: &str,
    ) -> StoreResult<Vec<ContactRequest>> {
        let inner = self.inner.read().await;
        let mut requests: Vec<ContactRequest> = inner
            .contact_requests
            .iter()
            .filter(|r| r.requester_email == requester_email)
            .cloned()
            .collect();
        // newest first; on equal timestamps the later insert comes first
        requests.reverse();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn resolve_contact_request(
        &self,
        id: Uuid,
        status: ContactStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ContactRequest>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .contact_requests
            .iter_mut()
            .find(|r| r.id == id && r.status == ContactStatus::Pending)
            .map(|request| {
                request.status = status;
                match status {
                    ContactStatus::Approved => request.approved_at = Some(at),
                    ContactStatus::Rejected => request.rejected_at = Some(at),
                    ContactStatus::Pending => {}
                }
                request.clone()
            }))
    }

    async fn insert_favourite(
        &self,
        user_email: &str,
        biodata_id: Uuid,
        added_at: DateTime<Utc>,
    ) -> StoreResult<Option<Favourite>> {
        let mut inner = self.inner.write().await;
        if inner
            .favourites
            .iter()
            .any(|f| f.user_email == user_email && f.biodata_id == biodata_id)
        {
            return Ok(None);
        }

        let record = Favourite {
            id: Uuid::new_v4(),
            user_email: user_email.to_string(),
            biodata_id,
            added_at,
        };
        inner.favourites.push(record.clone());
        Ok(Some(record))
    }

    async fn list_favourites(&self, user_email: &str) -> StoreResult<Vec<Favourite>> {
        let inner = self.inner.read().await;
        let mut favourites: Vec<Favourite> = inner
            .favourites
            .iter()
            .filter(|f| f.user_email == user_email)
            .cloned()
            .collect();
        favourites.reverse();
        favourites.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(favourites)
    }

    async fn delete_favourite(&self, id: Uuid, user_email: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.favourites.len();
        inner
            .favourites
            .retain(|f| !(f.id == id && f.user_email == user_email));
        Ok(inner.favourites.len() < before)
    }

    async fn list_success_counters(&self) -> StoreResult<Vec<serde_json::Value>> {
        Ok(self.inner.read().await.success_counters.clone())
    }

    async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let inner = self.inner.read().await;
        let count_type = |t: BiodataType| {
            inner
                .biodatas
                .iter()
                .filter(|b| b.profile.biodata_type == t)
                .count() as i64
        };
        let count_status = |s: ContactStatus| {
            inner.contact_requests.iter().filter(|r| r.status == s).count() as i64
        };

        Ok(DashboardStats {
            total_users: inner.users.len() as i64,
            total_biodatas: inner.biodatas.len() as i64,
            male_biodatas: count_type(BiodataType::Male),
            female_biodatas: count_type(BiodataType::Female),
            premium_biodatas: inner
                .biodatas
                .iter()
                .filter(|b| b.is_premium == Some(true))
                .count() as i64,
            pending_contact_requests: count_status(ContactStatus::Pending),
            approved_contact_requests: count_status(ContactStatus::Approved),
            rejected_contact_requests: count_status(ContactStatus::Rejected),
        })
    }
}
