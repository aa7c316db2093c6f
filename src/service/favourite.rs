//! Favourite Service

use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use validator::Validate;

use super::access::AccessPolicy;
use crate::database::ProfileStore;
use crate::models::{
    AddFavouriteRequest, Favourite, FavouriteWithBiodata, FavouritesQuery, Identity,
};
use crate::utils::{
    error::{AppError, AppResult},
    validation::{describe_validation_errors, normalize_email, parse_id},
};

#[derive(Clone)]
pub struct FavouriteService {
    store: Arc<dyn ProfileStore>,
    access: AccessPolicy,
}

impl FavouriteService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            access: AccessPolicy::new(store.clone()),
            store,
        }
    }

    pub async fn add(&self, caller: &Identity, request: AddFavouriteRequest) -> AppResult<Favourite> {
        request
            .validate()
            .map_err(|e| AppError::Validation(describe_validation_errors(&e)))?;
        let biodata_id = parse_id(&request.biodata_id, "biodata")?;

        let favourite = self
            .store
            .insert_favourite(&caller.email, biodata_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::Duplicate("Biodata is already in favourites".to_string()))?;

        log::debug!("{} added biodata {} to favourites", caller.email, biodata_id);
        Ok(favourite)
    }

    /// Favourites of `query.email` (the caller by default), newest first.
    /// Only admins may list someone else's.
    pub async fn list(
        &self,
        caller: &Identity,
        query: FavouritesQuery,
    ) -> AppResult<Vec<FavouriteWithBiodata>> {
        let email = query
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(normalize_email)
            .unwrap_or_else(|| caller.email.clone());

        self.access.authorize_owner_or_admin(caller, &email).await?;
        let viewer = self.access.viewer(Some(caller)).await?;

        let favourites = self.store.list_favourites(&email).await?;
        try_join_all(favourites.into_iter().map(|favourite| {
            let viewer = &viewer;
            async move {
                let biodata = match self.store.find_biodata(favourite.biodata_id).await? {
                    Some(b) => Some(viewer.present(self.access.resolve_premium(b).await?)),
                    None => None,
                };
                Ok::<_, AppError>(FavouriteWithBiodata { favourite, biodata })
            }
        }))
        .await
    }

    /// Removes one of the caller's favourites. Someone else's favourite is
    /// reported exactly like a missing one.
    pub async fn remove(&self, caller: &Identity, id: &str) -> AppResult<()> {
        let id = parse_id(id, "favourite")?;

        if !self.store.delete_favourite(id, &caller.email).await? {
            return Err(AppError::NotFound("Favourite not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryProfileStore;
    use crate::models::{biodata::fixtures::complete_input, NewBiodata, NewUser, Role};

    async fn setup() -> (Arc<MemoryProfileStore>, FavouriteService) {
        let store = Arc::new(MemoryProfileStore::new());
        (store.clone(), FavouriteService::new(store))
    }

    async fn seed_biodata(store: &MemoryProfileStore, email: &str) -> uuid::Uuid {
        store
            .insert_biodata(NewBiodata {
                email: email.to_string(),
                profile: complete_input().into_profile(String::new()).unwrap(),
                is_premium: false,
            })
            .await
            .unwrap()
            .unwrap()
            .id
    }

    fn add_request(id: uuid::Uuid) -> AddFavouriteRequest {
        AddFavouriteRequest {
            biodata_id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_favourite_is_rejected() {
        let (store, service) = setup().await;
        let alice = Identity::new("alice@example.com", "uid-alice");
        let id = seed_biodata(&store, "bob@example.com").await;

        service.add(&alice, add_request(id)).await.unwrap();
        let again = service.add(&alice, add_request(id)).await;
        assert!(matches!(again, Err(AppError::Duplicate(_))));
        assert_eq!(store.list_favourites(&alice.email).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_id_is_invalid_input() {
        let (_, service) = setup().await;
        let alice = Identity::new("alice@example.com", "uid-alice");
        let result = service
            .add(
                &alice,
                AddFavouriteRequest {
                    biodata_id: "abc".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_joins_biodata_and_tolerates_dangling() {
        let (store, service) = setup().await;
        let alice = Identity::new("alice@example.com", "uid-alice");
        let kept = seed_biodata(&store, "bob@example.com").await;
        let removed = seed_biodata(&store, "dave@example.com").await;

        service.add(&alice, add_request(kept)).await.unwrap();
        service.add(&alice, add_request(removed)).await.unwrap();
        store.delete_biodata(removed).await.unwrap();

        let listed = service
            .list(&alice, FavouritesQuery::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);

        let joined = listed
            .iter()
            .find(|f| f.favourite.biodata_id == kept)
            .unwrap();
        let biodata = joined.biodata.as_ref().unwrap();
        assert_eq!(biodata.email, "bob@example.com");
        assert!(biodata.profile.contact.is_none());

        let dangling = listed
            .iter()
            .find(|f| f.favourite.biodata_id == removed)
            .unwrap();
        assert!(dangling.biodata.is_none());
    }

    #[tokio::test]
    async fn test_list_other_email_requires_admin() {
        let (store, service) = setup().await;
        let alice = Identity::new("alice@example.com", "uid-alice");
        let carol = Identity::new("carol@example.com", "uid-carol");
        let root = Identity::new("root@example.com", "uid-root");
        store
            .insert_user(NewUser {
                email: root.email.clone(),
                uid: None,
                name: None,
                photo_url: None,
            })
            .await
            .unwrap();
        store.set_user_role(&root.email, Role::Admin).await.unwrap();

        let query = FavouritesQuery {
            email: Some("Alice@Example.com".into()),
        };
        assert!(service.list(&alice, query.clone()).await.is_ok());
        assert!(matches!(
            service.list(&carol, query.clone()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(service.list(&root, query).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_only_own_favourite() {
        let (store, service) = setup().await;
        let alice = Identity::new("alice@example.com", "uid-alice");
        let carol = Identity::new("carol@example.com", "uid-carol");
        let id = seed_biodata(&store, "bob@example.com").await;
        let favourite = service.add(&alice, add_request(id)).await.unwrap();

        assert!(matches!(
            service.remove(&carol, &favourite.id.to_string()).await,
            Err(AppError::NotFound(_))
        ));
        service
            .remove(&alice, &favourite.id.to_string())
            .await
            .unwrap();
        assert!(matches!(
            service.remove(&alice, &favourite.id.to_string()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
