//! User Service Implementation
//!
//! Account creation, lookups and the admin-only role and premium changes.

use std::sync::Arc;
use validator::Validate;

use super::access::AccessPolicy;
use crate::database::ProfileStore;
use crate::models::{CreateUserRequest, Identity, NewUser, Role, User};
use crate::utils::{
    error::{AppError, AppResult},
    validation::{describe_validation_errors, normalize_email},
};

/// Core user service providing account operations
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn ProfileStore>,
    access: AccessPolicy,
}

impl UserService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            access: AccessPolicy::new(store.clone()),
            store,
        }
    }

    /// Creates the caller's own account, or another email's when the caller
    /// is an admin
    pub async fn create_user(
        &self,
        caller: &Identity,
        request: CreateUserRequest,
    ) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(describe_validation_errors(&e)))?;

        let email = request
            .email
            .as_deref()
            .map(normalize_email)
            .unwrap_or_else(|| caller.email.clone());
        let is_self = email == caller.email;

        if !is_self {
            self.access.require_admin(caller).await?;
        }

        let new_user = NewUser {
            email,
            uid: is_self.then(|| caller.uid.clone()),
            name: request.name.map(|n| n.trim().to_string()),
            photo_url: request.photo_url,
        };

        let user = self
            .store
            .insert_user(new_user)
            .await?
            .ok_or_else(|| AppError::Conflict("User already exists".to_string()))?;

        log::info!("Created user {}", user.email);
        Ok(user)
    }

    pub async fn list_users(&self, caller: &Identity) -> AppResult<Vec<User>> {
        self.access.require_admin(caller).await?;
        Ok(self.store.list_users().await?)
    }

    /// Self or admin
    pub async fn get_user(&self, caller: &Identity, email: &str) -> AppResult<User> {
        let email = normalize_email(email);
        self.access.authorize_owner_or_admin(caller, &email).await?;

        self.store
            .find_user(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn set_role(&self, caller: &Identity, email: &str, role: Role) -> AppResult<User> {
        self.access.require_admin(caller).await?;

        let email = normalize_email(email);
        if email == caller.email {
            return Err(AppError::Forbidden(
                "Admins cannot change their own role".to_string(),
            ));
        }

        let user = self
            .store
            .set_user_role(&email, role)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        log::info!("{} set role of {} to {}", caller.email, user.email, role);
        Ok(user)
    }

    pub async fn set_premium(
        &self,
        caller: &Identity,
        email: &str,
        is_premium: bool,
    ) -> AppResult<User> {
        self.access.require_admin(caller).await?;
        self.apply_premium(&normalize_email(email), is_premium).await
    }

    /// Writes the user's flag, then copies it onto their biodata. The two
    /// writes are independent; reads resolve any gap with the effective rule.
    pub async fn apply_premium(&self, email: &str, is_premium: bool) -> AppResult<User> {
        let user = self
            .store
            .set_user_premium(email, is_premium)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let touched = self.store.set_biodata_premium(email, is_premium).await?;
        log::info!(
            "Premium for {} set to {} ({} biodata updated)",
            email,
            is_premium,
            touched
        );

        Ok(user)
    }

    /// Sets a role without an acting admin, creating a bare account when the
    /// email has none. Used to bootstrap the first admin.
    pub async fn provision_role(&self, email: &str, role: Role) -> AppResult<User> {
        let email = normalize_email(email);

        if self.store.find_user(&email).await?.is_none() {
            self.store
                .insert_user(NewUser {
                    email: email.clone(),
                    uid: None,
                    name: None,
                    photo_url: None,
                })
                .await?;
        }

        let user = self
            .store
            .set_user_role(&email, role)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        log::info!("Provisioned {} with role {}", user.email, role);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryProfileStore;
    use crate::models::{biodata::fixtures::complete_input, NewBiodata};

    async fn setup() -> (Arc<MemoryProfileStore>, UserService, Identity) {
        let store = Arc::new(MemoryProfileStore::new());
        let service = UserService::new(store.clone());
        let admin = Identity::new("root@example.com", "uid-root");
        service
            .provision_role(&admin.email, Role::Admin)
            .await
            .unwrap();
        (store, service, admin)
    }

    #[tokio::test]
    async fn test_create_own_user_then_conflict() {
        let (_, service, _) = setup().await;
        let alice = Identity::new("Alice@Example.com", "uid-alice");

        let user = service
            .create_user(&alice, CreateUserRequest::default())
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.uid.as_deref(), Some("uid-alice"));
        assert_eq!(user.role, Role::User);
        assert!(!user.is_premium);

        let again = service
            .create_user(&alice, CreateUserRequest::default())
            .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_only_admin_creates_for_other_email() {
        let (_, service, admin) = setup().await;
        let alice = Identity::new("alice@example.com", "uid-alice");
        let request = CreateUserRequest {
            email: Some("Bob@Example.com".into()),
            ..Default::default()
        };

        assert!(matches!(
            service.create_user(&alice, request.clone()).await,
            Err(AppError::Forbidden(_))
        ));

        let bob = service.create_user(&admin, request).await.unwrap();
        assert_eq!(bob.email, "bob@example.com");
        assert!(bob.uid.is_none());
    }

    #[tokio::test]
    async fn test_get_user_is_self_or_admin() {
        let (_, service, admin) = setup().await;
        let alice = Identity::new("alice@example.com", "uid-alice");
        let carol = Identity::new("carol@example.com", "uid-carol");
        service
            .create_user(&alice, CreateUserRequest::default())
            .await
            .unwrap();

        assert!(service.get_user(&alice, "ALICE@example.com").await.is_ok());
        assert!(service.get_user(&admin, "alice@example.com").await.is_ok());
        assert!(matches!(
            service.get_user(&carol, "alice@example.com").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.get_user(&admin, "nobody@example.com").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_cannot_change_own_role() {
        let (_, service, admin) = setup().await;
        let result = service.set_role(&admin, "Root@Example.com", Role::User).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let alice = Identity::new("alice@example.com", "uid-alice");
        service
            .create_user(&alice, CreateUserRequest::default())
            .await
            .unwrap();
        let promoted = service
            .set_role(&admin, "alice@example.com", Role::Admin)
            .await
            .unwrap();
        assert!(promoted.is_admin());

        // Non-admins cannot change roles at all
        let carol = Identity::new("carol@example.com", "uid-carol");
        assert!(service
            .set_role(&carol, "alice@example.com", Role::User)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_set_premium_propagates_to_biodata() {
        let (store, service, admin) = setup().await;
        let alice = Identity::new("alice@example.com", "uid-alice");
        service
            .create_user(&alice, CreateUserRequest::default())
            .await
            .unwrap();
        store
            .insert_biodata(NewBiodata {
                email: "alice@example.com".into(),
                profile: complete_input().into_profile(String::new()).unwrap(),
                is_premium: false,
            })
            .await
            .unwrap();

        let user = service
            .set_premium(&admin, "alice@example.com", true)
            .await
            .unwrap();
        assert!(user.is_premium);

        let biodata = store
            .find_biodata_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(biodata.is_premium, Some(true));
    }

    #[tokio::test]
    async fn test_set_premium_unknown_user_is_not_found() {
        let (_, service, admin) = setup().await;
        assert!(matches!(
            service.set_premium(&admin, "ghost@example.com", true).await,
            Err(AppError::NotFound(_))
        ));
    }
}
