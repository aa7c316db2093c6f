//! Contact Request Service
//!
//! Premium members ask to see another member's contact details; an admin
//! approves or rejects each request exactly once.

use chrono::Utc;
use futures::future::{try_join, try_join_all};
use std::sync::Arc;
use validator::Validate;

use super::access::AccessPolicy;
use crate::database::ProfileStore;
use crate::models::{
    ContactRequest, ContactRequestDetails, ContactRequestQuery, ContactStatus,
    CreateContactRequest, Decision, Identity, MyContactRequest, Transition,
};
use crate::utils::{
    error::{AppError, AppResult},
    validation::{describe_validation_errors, parse_id},
};

#[derive(Clone)]
pub struct ContactRequestService {
    store: Arc<dyn ProfileStore>,
    access: AccessPolicy,
}

impl ContactRequestService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            access: AccessPolicy::new(store.clone()),
            store,
        }
    }

    pub async fn create(
        &self,
        caller: &Identity,
        request: CreateContactRequest,
    ) -> AppResult<ContactRequest> {
        request
            .validate()
            .map_err(|e| AppError::Validation(describe_validation_errors(&e)))?;
        let biodata_id = parse_id(&request.biodata_id, "biodata")?;

        self.access.require_premium(caller).await?;

        let biodata = self
            .store
            .find_biodata(biodata_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Biodata not found".to_string()))?;

        if biodata.email == caller.email {
            return Err(AppError::Validation(
                "You cannot request contact details for your own biodata".to_string(),
            ));
        }

        let created = self
            .store
            .insert_contact_request(&caller.email, biodata_id, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Contact request already exists for this biodata".to_string())
            })?;

        log::info!(
            "Contact request {} created by {} for biodata {}",
            created.id,
            created.requester_email,
            biodata_id
        );
        Ok(created)
    }

    pub async fn approve(&self, caller: &Identity, id: &str) -> AppResult<ContactRequest> {
        self.decide(caller, id, Decision::Approve).await
    }

    pub async fn reject(&self, caller: &Identity, id: &str) -> AppResult<ContactRequest> {
        self.decide(caller, id, Decision::Reject).await
    }

    /// Applies an admin decision. Repeating the same decision returns the
    /// request unchanged; reversing a resolved request is a conflict.
    pub async fn decide(
        &self,
        caller: &Identity,
        id: &str,
        decision: Decision,
    ) -> AppResult<ContactRequest> {
        self.access.require_admin(caller).await?;
        let id = parse_id(id, "contact request")?;

        let current = self.find(id).await?;
        if let Some(settled) = settle(current, decision)? {
            return Ok(settled);
        }

        let target = decision.target();
        match self.store.resolve_contact_request(id, target, Utc::now()).await? {
            Some(resolved) => {
                log::info!(
                    "Contact request {} {} by {}",
                    resolved.id,
                    resolved.status,
                    caller.email
                );
                Ok(resolved)
            }
            None => {
                // Resolved by someone else between the read and the update
                let current = self.find(id).await?;
                settle(current, decision)?.ok_or_else(|| {
                    AppError::Internal(format!("Contact request {} could not be resolved", id))
                })
            }
        }
    }

    /// All requests, each joined with its biodata and requester
    pub async fn list_for_admin(
        &self,
        caller: &Identity,
        query: ContactRequestQuery,
    ) -> AppResult<Vec<ContactRequestDetails>> {
        self.access.require_admin(caller).await?;

        let status = query
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<ContactStatus>)
            .transpose()
            .map_err(AppError::Validation)?;

        let requests = self.store.list_contact_requests(status).await?;

        try_join_all(requests.into_iter().map(|request| async move {
            let (biodata, requester) = try_join(
                self.store.find_biodata(request.requested_biodata_id),
                self.store.find_user(&request.requester_email),
            )
            .await?;

            let biodata = match biodata {
                Some(b) => Some(self.access.resolve_premium(b).await?),
                None => None,
            };

            Ok::<_, AppError>(ContactRequestDetails {
                request,
                biodata,
                requester,
            })
        }))
        .await
    }

    /// The caller's requests, newest first; only approved entries carry the
    /// biodata
    pub async fn list_mine(&self, caller: &Identity) -> AppResult<Vec<MyContactRequest>> {
        let requests = self
            .store
            .list_contact_requests_by_requester(&caller.email)
            .await?;

        try_join_all(requests.into_iter().map(|request| async move {
            let biodata = if request.status == ContactStatus::Approved {
                match self.store.find_biodata(request.requested_biodata_id).await? {
                    Some(b) => Some(self.access.resolve_premium(b).await?),
                    None => None,
                }
            } else {
                None
            };

            Ok::<_, AppError>(MyContactRequest { request, biodata })
        }))
        .await
    }

    async fn find(&self, id: uuid::Uuid) -> AppResult<ContactRequest> {
        self.store
            .find_contact_request(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contact request not found".to_string()))
    }
}

/// `Some` when the request needs no write, `None` when it is still pending
fn settle(current: ContactRequest, decision: Decision) -> AppResult<Option<ContactRequest>> {
    match Transition::plan(current.status, decision) {
        Transition::Apply(_) => Ok(None),
        Transition::AlreadyApplied => Ok(Some(current)),
        Transition::Blocked(status) => Err(AppError::Conflict(format!(
            "Contact request is already {}",
            status
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryProfileStore;
    use crate::models::{biodata::fixtures::complete_input, Biodata, NewBiodata, NewUser, Role};

    struct Harness {
        store: Arc<MemoryProfileStore>,
        service: ContactRequestService,
        admin: Identity,
        premium: Identity,
        target: Biodata,
    }

    async fn add_user(store: &MemoryProfileStore, email: &str, role: Role, is_premium: bool) {
        store
            .insert_user(NewUser {
                email: email.to_string(),
                uid: None,
                name: None,
                photo_url: None,
            })
            .await
            .unwrap();
        store.set_user_role(email, role).await.unwrap();
        store.set_user_premium(email, is_premium).await.unwrap();
    }

    async fn add_biodata(store: &MemoryProfileStore, email: &str) -> Biodata {
        store
            .insert_biodata(NewBiodata {
                email: email.to_string(),
                profile: complete_input().into_profile(String::new()).unwrap(),
                is_premium: false,
            })
            .await
            .unwrap()
            .unwrap()
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryProfileStore::new());
        add_user(&store, "root@example.com", Role::Admin, false).await;
        add_user(&store, "alice@example.com", Role::User, true).await;
        add_user(&store, "bob@example.com", Role::User, false).await;
        let target = add_biodata(&store, "bob@example.com").await;

        Harness {
            service: ContactRequestService::new(store.clone()),
            store,
            admin: Identity::new("root@example.com", "uid-root"),
            premium: Identity::new("alice@example.com", "uid-alice"),
            target,
        }
    }

    fn request_for(biodata: &Biodata) -> CreateContactRequest {
        CreateContactRequest {
            biodata_id: biodata.id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_non_premium_is_forbidden_and_nothing_stored() {
        let h = harness().await;
        let carol = Identity::new("carol@example.com", "uid-carol");

        let result = h.service.create(&carol, request_for(&h.target)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(h.store.list_contact_requests(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_create_for_pair_conflicts() {
        let h = harness().await;

        let first = h
            .service
            .create(&h.premium, request_for(&h.target))
            .await
            .unwrap();
        assert_eq!(first.status, ContactStatus::Pending);

        let second = h.service.create(&h.premium, request_for(&h.target)).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(h.store.list_contact_requests(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_checks_target() {
        let h = harness().await;

        let missing = CreateContactRequest {
            biodata_id: uuid::Uuid::new_v4().to_string(),
        };
        assert!(matches!(
            h.service.create(&h.premium, missing).await,
            Err(AppError::NotFound(_))
        ));

        let malformed = CreateContactRequest {
            biodata_id: "12345".into(),
        };
        assert!(matches!(
            h.service.create(&h.premium, malformed).await,
            Err(AppError::Validation(_))
        ));

        let own = add_biodata(&h.store, "alice@example.com").await;
        // The new biodata carries `false`; restore premium on it
        h.store
            .set_biodata_premium("alice@example.com", true)
            .await
            .unwrap();
        assert!(matches!(
            h.service.create(&h.premium, request_for(&own)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_approve_is_idempotent() {
        let h = harness().await;
        let created = h
            .service
            .create(&h.premium, request_for(&h.target))
            .await
            .unwrap();
        let id = created.id.to_string();

        let approved = h.service.approve(&h.admin, &id).await.unwrap();
        assert_eq!(approved.status, ContactStatus::Approved);
        let stamped = approved.approved_at.unwrap();

        let again = h.service.approve(&h.admin, &id).await.unwrap();
        assert_eq!(again.status, ContactStatus::Approved);
        assert_eq!(again.approved_at, Some(stamped));
        assert!(again.rejected_at.is_none());

        assert!(matches!(
            h.service.reject(&h.admin, &id).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_reject_sets_rejected_at() {
        let h = harness().await;
        let created = h
            .service
            .create(&h.premium, request_for(&h.target))
            .await
            .unwrap();

        let rejected = h
            .service
            .reject(&h.admin, &created.id.to_string())
            .await
            .unwrap();
        assert_eq!(rejected.status, ContactStatus::Rejected);
        assert!(rejected.rejected_at.is_some());
        assert!(rejected.approved_at.is_none());
    }

    #[tokio::test]
    async fn test_decisions_are_admin_only() {
        let h = harness().await;
        let created = h
            .service
            .create(&h.premium, request_for(&h.target))
            .await
            .unwrap();

        assert!(matches!(
            h.service.approve(&h.premium, &created.id.to_string()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            h.service
                .approve(&h.admin, &uuid::Uuid::new_v4().to_string())
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_mine_attaches_biodata_only_when_approved() {
        let h = harness().await;
        let other = add_biodata(&h.store, "dave@example.com").await;

        let pending = h
            .service
            .create(&h.premium, request_for(&h.target))
            .await
            .unwrap();
        let approved = h
            .service
            .create(&h.premium, request_for(&other))
            .await
            .unwrap();
        h.service
            .approve(&h.admin, &approved.id.to_string())
            .await
            .unwrap();

        let mine = h.service.list_mine(&h.premium).await.unwrap();
        assert_eq!(mine.len(), 2);

        let approved_entry = mine.iter().find(|m| m.request.id == approved.id).unwrap();
        let pending_entry = mine.iter().find(|m| m.request.id == pending.id).unwrap();
        let attached = approved_entry.biodata.as_ref().unwrap();
        assert_eq!(attached.id, other.id);
        assert!(attached.profile.contact.is_some());
        assert!(pending_entry.biodata.is_none());
    }

    #[tokio::test]
    async fn test_admin_listing_joins_and_filters() {
        let h = harness().await;
        let other = add_biodata(&h.store, "dave@example.com").await;

        let first = h
            .service
            .create(&h.premium, request_for(&h.target))
            .await
            .unwrap();
        let second = h
            .service
            .create(&h.premium, request_for(&other))
            .await
            .unwrap();
        h.service
            .reject(&h.admin, &second.id.to_string())
            .await
            .unwrap();

        let all = h
            .service
            .list_for_admin(&h.admin, ContactRequestQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].request.id, first.id);
        assert_eq!(all[1].request.id, second.id);
        assert_eq!(all[0].biodata.as_ref().unwrap().id, h.target.id);
        assert_eq!(
            all[0].requester.as_ref().unwrap().email,
            "alice@example.com"
        );

        let pending = h
            .service
            .list_for_admin(
                &h.admin,
                ContactRequestQuery {
                    status: Some("pending".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request.id, first.id);

        let bad = ContactRequestQuery {
            status: Some("archived".into()),
        };
        assert!(matches!(
            h.service.list_for_admin(&h.admin, bad).await,
            Err(AppError::Validation(_))
        ));
        assert!(h
            .service
            .list_for_admin(&h.premium, ContactRequestQuery::default())
            .await
            .is_err());
    }
}
