//! Access Policy
//!
//! Self, admin and premium checks derived from the stored user records.
//! Nothing here writes to the store.

use futures::future::try_join_all;
use std::sync::Arc;

use crate::database::ProfileStore;
use crate::models::{Biodata, Identity, User};
use crate::utils::{
    error::{AppError, AppResult},
    validation::emails_match,
};

/// Outcome of an ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Forbid,
}

/// Self-access first, then the admin override; everything else is forbidden
pub fn decide(caller: &Identity, owner_email: &str, caller_record: Option<&User>) -> Access {
    if emails_match(&caller.email, owner_email) {
        return Access::Allow;
    }

    match caller_record {
        Some(user) if user.is_admin() => Access::Allow,
        _ => Access::Forbid,
    }
}

/// The biodata flag when it carries one, else the user's flag, else `false`
pub fn effective_premium(biodata: Option<&Biodata>, user: Option<&User>) -> bool {
    biodata
        .and_then(|b| b.is_premium)
        .or_else(|| user.map(|u| u.is_premium))
        .unwrap_or(false)
}

/// Who is reading a biodata. Contact details are only shown to the owner
/// and to admins.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    email: Option<String>,
    is_admin: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn can_see_contact(&self, biodata: &Biodata) -> bool {
        self.is_admin
            || self
                .email
                .as_deref()
                .is_some_and(|email| emails_match(email, &biodata.email))
    }

    pub fn present(&self, biodata: Biodata) -> Biodata {
        if self.can_see_contact(&biodata) {
            biodata
        } else {
            biodata.without_contact()
        }
    }
}

#[derive(Clone)]
pub struct AccessPolicy {
    store: Arc<dyn ProfileStore>,
}

impl AccessPolicy {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Fails with `Forbidden` unless the caller's stored role is admin
    pub async fn require_admin(&self, caller: &Identity) -> AppResult<User> {
        match self.store.find_user(&caller.email).await? {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(AppError::Forbidden("Admin access required".to_string())),
        }
    }

    pub async fn is_admin(&self, caller: &Identity) -> AppResult<bool> {
        Ok(self
            .store
            .find_user(&caller.email)
            .await?
            .is_some_and(|user| user.is_admin()))
    }

    pub async fn authorize_owner_or_admin(
        &self,
        caller: &Identity,
        owner_email: &str,
    ) -> AppResult<()> {
        // Self-access needs no lookup
        if emails_match(&caller.email, owner_email) {
            return Ok(());
        }

        let caller_record = self.store.find_user(&caller.email).await?;
        match decide(caller, owner_email, caller_record.as_ref()) {
            Access::Allow => Ok(()),
            Access::Forbid => Err(AppError::Forbidden(
                "You do not have access to this resource".to_string(),
            )),
        }
    }

    pub async fn effective_premium_of(&self, email: &str) -> AppResult<bool> {
        let biodata = self.store.find_biodata_by_email(email).await?;
        if let Some(flag) = biodata.as_ref().and_then(|b| b.is_premium) {
            return Ok(flag);
        }

        let user = self.store.find_user(email).await?;
        Ok(effective_premium(biodata.as_ref(), user.as_ref()))
    }

    pub async fn require_premium(&self, caller: &Identity) -> AppResult<()> {
        if self.effective_premium_of(&caller.email).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Premium membership required to request contact details".to_string(),
            ))
        }
    }

    pub async fn viewer(&self, caller: Option<&Identity>) -> AppResult<Viewer> {
        match caller {
            Some(identity) => Ok(Viewer {
                email: Some(identity.email.clone()),
                is_admin: self.is_admin(identity).await?,
            }),
            None => Ok(Viewer::anonymous()),
        }
    }

    /// Fills in the premium flag of records that predate it from the owner
    pub async fn resolve_premium(&self, mut biodata: Biodata) -> AppResult<Biodata> {
        if biodata.is_premium.is_none() {
            let owner = self.store.find_user(&biodata.email).await?;
            biodata.is_premium = Some(effective_premium(None, owner.as_ref()));
        }
        Ok(biodata)
    }

    /// Resolves a batch concurrently, keeping input order
    pub async fn resolve_premium_all(&self, biodatas: Vec<Biodata>) -> AppResult<Vec<Biodata>> {
        try_join_all(biodatas.into_iter().map(|b| self.resolve_premium(b))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryProfileStore;
    use crate::models::{biodata::fixtures::complete_input, NewBiodata, NewUser, Role};
    use chrono::Utc;
    use uuid::Uuid;

    fn user(email: &str, role: Role, is_premium: bool) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            uid: None,
            name: None,
            photo_url: None,
            role,
            is_premium,
            created_at: now,
            updated_at: now,
        }
    }

    fn biodata(email: &str, is_premium: Option<bool>) -> Biodata {
        let now = Utc::now();
        Biodata {
            id: Uuid::new_v4(),
            email: email.to_string(),
            profile: complete_input().into_profile(String::new()).unwrap(),
            is_premium,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_decide_precedence() {
        let bob = Identity::new("Bob@Example.com", "uid-bob");
        assert_eq!(decide(&bob, "bob@example.com", None), Access::Allow);

        let admin = user("bob@example.com", Role::Admin, false);
        assert_eq!(decide(&bob, "carol@example.com", Some(&admin)), Access::Allow);

        let member = user("bob@example.com", Role::User, true);
        assert_eq!(decide(&bob, "carol@example.com", Some(&member)), Access::Forbid);
        assert_eq!(decide(&bob, "carol@example.com", None), Access::Forbid);
    }

    #[test]
    fn test_effective_premium_prefers_biodata_flag() {
        let premium_user = user("a@example.com", Role::User, true);
        let plain_user = user("a@example.com", Role::User, false);

        assert!(!effective_premium(Some(&biodata("a@example.com", Some(false))), Some(&premium_user)));
        assert!(effective_premium(Some(&biodata("a@example.com", Some(true))), Some(&plain_user)));
        assert!(effective_premium(Some(&biodata("a@example.com", None)), Some(&premium_user)));
        assert!(effective_premium(None, Some(&premium_user)));
        assert!(!effective_premium(None, None));
    }

    #[test]
    fn test_viewer_redacts_contact_for_strangers() {
        let record = biodata("alice@example.com", Some(false));

        let owner = Viewer {
            email: Some("alice@example.com".into()),
            is_admin: false,
        };
        assert!(owner.present(record.clone()).profile.contact.is_some());

        let admin = Viewer {
            email: Some("root@example.com".into()),
            is_admin: true,
        };
        assert!(admin.present(record.clone()).profile.contact.is_some());

        assert!(Viewer::anonymous().present(record).profile.contact.is_none());
    }

    #[tokio::test]
    async fn test_require_premium_uses_effective_rule() {
        let store = Arc::new(MemoryProfileStore::new());
        let policy = AccessPolicy::new(store.clone());
        let alice = Identity::new("alice@example.com", "uid-alice");

        assert!(matches!(
            policy.require_premium(&alice).await,
            Err(AppError::Forbidden(_))
        ));

        store.upsert_user_premium("alice@example.com", true).await.unwrap();
        assert!(policy.require_premium(&alice).await.is_ok());

        // A biodata carrying its own flag takes precedence
        store
            .insert_biodata(NewBiodata {
                email: "alice@example.com".into(),
                profile: complete_input().into_profile(String::new()).unwrap(),
                is_premium: false,
            })
            .await
            .unwrap();
        assert!(policy.require_premium(&alice).await.is_err());
    }

    #[tokio::test]
    async fn test_require_admin() {
        let store = Arc::new(MemoryProfileStore::new());
        let policy = AccessPolicy::new(store.clone());
        let root = Identity::new("root@example.com", "uid-root");

        assert!(policy.require_admin(&root).await.is_err());

        store
            .insert_user(NewUser {
                email: "root@example.com".into(),
                uid: None,
                name: None,
                photo_url: None,
            })
            .await
            .unwrap();
        store.set_user_role("root@example.com", Role::Admin).await.unwrap();
        assert!(policy.require_admin(&root).await.is_ok());
    }
}
