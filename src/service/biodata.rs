//! Biodata Service
//!
//! Creating, editing, listing and removing biodatas, including profile image
//! uploads and the premium flag stamped onto each record.

use std::sync::Arc;

use super::access::{AccessPolicy, Viewer};
use super::image_store::{ImageStore, ImageUpload};
use crate::database::{Pagination, ProfileStore};
use crate::models::{
    Biodata, BiodataFilter, BiodataInput, BiodataListQuery, BiodataPage, BiodataType,
    DashboardStats, Identity, NewBiodata,
};
use crate::utils::{
    error::{AppError, AppResult},
    validation::parse_id,
};

#[derive(Clone)]
pub struct BiodataService {
    store: Arc<dyn ProfileStore>,
    images: Arc<dyn ImageStore>,
    access: AccessPolicy,
    max_image_bytes: usize,
}

impl BiodataService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        images: Arc<dyn ImageStore>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            access: AccessPolicy::new(store.clone()),
            store,
            images,
            max_image_bytes,
        }
    }

    pub fn access(&self) -> &AccessPolicy {
        &self.access
    }

    /// Creates the caller's biodata. An image is required and uploaded only
    /// after every local check has passed.
    pub async fn create(
        &self,
        caller: &Identity,
        input: BiodataInput,
        image: Option<ImageUpload>,
    ) -> AppResult<Biodata> {
        input.validate_values()?;
        input.check_complete()?;

        let image = image
            .ok_or_else(|| AppError::Validation("profileImage is required".to_string()))?;
        image.check(self.max_image_bytes)?;

        if input.is_premium.is_some() {
            self.access.require_admin(caller).await?;
        }

        if self.store.find_biodata_by_email(&caller.email).await?.is_some() {
            return Err(AppError::Duplicate(
                "Biodata already exists for this user".to_string(),
            ));
        }

        let is_premium = match input.is_premium {
            Some(explicit) => explicit,
            None => self
                .store
                .find_user(&caller.email)
                .await?
                .is_some_and(|user| user.is_premium),
        };

        let image_url = self.images.upload(image).await.map_err(|e| {
            log::error!("Profile image upload failed for {}: {}", caller.email, e);
            AppError::from(e)
        })?;

        let new_biodata = NewBiodata {
            email: caller.email.clone(),
            profile: input.into_profile(image_url)?,
            is_premium,
        };

        let biodata = self.store.insert_biodata(new_biodata).await?.ok_or_else(|| {
            AppError::Duplicate("Biodata already exists for this user".to_string())
        })?;

        log::info!("Created biodata {} for {}", biodata.id, biodata.email);
        Ok(biodata)
    }

    /// Merges the supplied fields over the stored biodata. Owner or admin.
    pub async fn update(
        &self,
        caller: &Identity,
        id: &str,
        input: BiodataInput,
        image: Option<ImageUpload>,
    ) -> AppResult<Biodata> {
        let id = parse_id(id, "biodata")?;
        let mut biodata = self
            .store
            .find_biodata(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Biodata not found".to_string()))?;

        self.access
            .authorize_owner_or_admin(caller, &biodata.email)
            .await?;
        input.validate_values()?;

        if input.is_premium.is_some() {
            self.access.require_admin(caller).await?;
        }

        if let Some(image) = image {
            image.check(self.max_image_bytes)?;
            match self.images.upload(image).await {
                Ok(url) => biodata.profile.profile_image = url,
                Err(e) => log::warn!(
                    "Profile image upload failed for biodata {}, keeping existing image: {}",
                    biodata.id,
                    e
                ),
            }
        }

        let is_premium = match input.is_premium {
            Some(explicit) => explicit,
            None => match self.store.find_user(&biodata.email).await? {
                Some(owner) => owner.is_premium,
                None => biodata.is_premium.unwrap_or(false),
            },
        };

        input.apply_to(&mut biodata.profile);
        biodata.is_premium = Some(is_premium);

        let updated = self
            .store
            .replace_biodata(&biodata)
            .await?
            .ok_or_else(|| AppError::NotFound("Biodata not found".to_string()))?;

        if let Err(e) = self
            .store
            .upsert_user_premium(&updated.email, is_premium)
            .await
        {
            log::error!(
                "Biodata {} updated but premium write-back for {} failed: {}",
                updated.id,
                updated.email,
                e
            );
            return Err(e.into());
        }

        log::info!("{} updated biodata {}", caller.email, updated.id);
        Ok(updated)
    }

    pub async fn get(&self, viewer: &Viewer, id: &str) -> AppResult<Biodata> {
        let id = parse_id(id, "biodata")?;
        let biodata = self
            .store
            .find_biodata(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Biodata not found".to_string()))?;

        let biodata = self.access.resolve_premium(biodata).await?;
        Ok(viewer.present(biodata))
    }

    pub async fn list(&self, viewer: &Viewer, query: BiodataListQuery) -> AppResult<BiodataPage> {
        let filter = build_filter(&query)?;
        let pagination = Pagination::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(Pagination::DEFAULT_PER_PAGE),
        );

        let (items, total) = self.store.list_biodatas(&filter, &pagination).await?;
        let items = self
            .access
            .resolve_premium_all(items)
            .await?
            .into_iter()
            .map(|b| viewer.present(b))
            .collect();

        Ok(BiodataPage {
            items,
            total,
            page: pagination.page(),
            limit: pagination.limit as u32,
        })
    }

    /// The caller's own biodata, contact details included
    pub async fn mine(&self, caller: &Identity) -> AppResult<Biodata> {
        let biodata = self
            .store
            .find_biodata_by_email(&caller.email)
            .await?
            .ok_or_else(|| AppError::NotFound("You have not created a biodata yet".to_string()))?;

        self.access.resolve_premium(biodata).await
    }

    pub async fn delete(&self, caller: &Identity, id: &str) -> AppResult<()> {
        self.access.require_admin(caller).await?;
        let id = parse_id(id, "biodata")?;

        if !self.store.delete_biodata(id).await? {
            return Err(AppError::NotFound("Biodata not found".to_string()));
        }

        log::info!("{} deleted biodata {}", caller.email, id);
        Ok(())
    }

    pub async fn dashboard_stats(&self, caller: &Identity) -> AppResult<DashboardStats> {
        self.access.require_admin(caller).await?;
        Ok(self.store.dashboard_stats().await?)
    }

    /// Success counter documents, returned as stored
    pub async fn success_counters(&self) -> AppResult<Vec<serde_json::Value>> {
        Ok(self.store.list_success_counters().await?)
    }
}

fn build_filter(query: &BiodataListQuery) -> AppResult<BiodataFilter> {
    let biodata_type = query
        .biodata_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::parse::<BiodataType>)
        .transpose()
        .map_err(AppError::Validation)?;

    if let (Some(min), Some(max)) = (query.min_age, query.max_age) {
        if min > max {
            return Err(AppError::Validation(
                "minAge cannot be greater than maxAge".to_string(),
            ));
        }
    }

    Ok(BiodataFilter {
        biodata_type,
        permanent_division: query
            .permanent_division
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        min_age: query.min_age,
        max_age: query.max_age,
    })
}
