//! PostgreSQL Profile Store
//!
//! [`ProfileStore`] backed by SQLx. Duplicate inserts are detected with
//! `ON CONFLICT DO NOTHING RETURNING`, so two concurrent requests for the same
//! pair cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::connection::Pagination;
use super::store::{ProfileStore, StoreError, StoreResult};
use crate::models::{
    Biodata, BiodataFilter, BiodataProfile, ContactDetails, ContactRequest, ContactStatus,
    DashboardStats, Favourite, NewBiodata, NewUser, Role, User,
};

macro_rules! user_columns {
    () => {
        "id, email, uid, name, photo_url, role, is_premium, created_at, updated_at"
    };
}

macro_rules! biodata_columns {
    () => {
        "id, email, biodata_type, name, dob, height, weight, age, occupation, race, \
         father_name, mother_name, permanent_division, present_division, partner_age, \
         partner_height, partner_weight, contact_email, mobile_number, marital_status, \
         profile_image, is_premium, created_at, updated_at"
    };
}

macro_rules! contact_request_columns {
    () => {
        "id, requester_email, requested_biodata_id, status, created_at, approved_at, rejected_at"
    };
}

macro_rules! biodata_filter {
    () => {
        "WHERE ($1::text IS NULL OR biodata_type = $1) \
         AND ($2::text IS NULL OR LOWER(permanent_division) = LOWER($2)) \
         AND ($3::int IS NULL OR age >= $3) \
         AND ($4::int IS NULL OR age <= $4)"
    };
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    uid: Option<String>,
    name: Option<String>,
    photo_url: Option<String>,
    role: String,
    is_premium: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|reason| StoreError::Corrupt {
            table: "users",
            reason,
        })?;

        Ok(User {
            id: row.id,
            email: row.email,
            uid: row.uid,
            name: row.name,
            photo_url: row.photo_url,
            role,
            is_premium: row.is_premium,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BiodataRow {
    id: Uuid,
    email: String,
    biodata_type: String,
    name: String,
    dob: NaiveDate,
    height: String,
    weight: String,
    age: i32,
    occupation: String,
    race: String,
    father_name: String,
    mother_name: String,
    permanent_division: String,
    present_division: String,
    partner_age: Option<String>,
    partner_height: Option<String>,
    partner_weight: Option<String>,
    contact_email: String,
    mobile_number: String,
    marital_status: Option<String>,
    profile_image: String,
    is_premium: Option<bool>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BiodataRow> for Biodata {
    type Error = StoreError;

    fn try_from(row: BiodataRow) -> Result<Self, Self::Error> {
        let biodata_type = row
            .biodata_type
            .parse()
            .map_err(|reason| StoreError::Corrupt {
                table: "members",
                reason,
            })?;

        Ok(Biodata {
            id: row.id,
            email: row.email,
            profile: BiodataProfile {
                biodata_type,
                name: row.name,
                dob: row.dob,
                height: row.height,
                weight: row.weight,
                age: row.age,
                occupation: row.occupation,
                race: row.race,
                father_name: row.father_name,
                mother_name: row.mother_name,
                permanent_division: row.permanent_division,
                present_division: row.present_division,
                partner_age: row.partner_age,
                partner_height: row.partner_height,
                partner_weight: row.partner_weight,
                marital_status: row.marital_status,
                profile_image: row.profile_image,
                contact: Some(ContactDetails {
                    contact_email: row.contact_email,
                    mobile_number: row.mobile_number,
                }),
            },
            is_premium: row.is_premium,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactRequestRow {
    id: Uuid,
    requester_email: String,
    requested_biodata_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
}

impl TryFrom<ContactRequestRow> for ContactRequest {
    type Error = StoreError;

    fn try_from(row: ContactRequestRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|reason| StoreError::Corrupt {
            table: "contact_requests",
            reason,
        })?;

        Ok(ContactRequest {
            id: row.id,
            requester_email: row.requester_email,
            requested_biodata_id: row.requested_biodata_id,
            status,
            created_at: row.created_at,
            approved_at: row.approved_at,
            rejected_at: row.rejected_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FavouriteRow {
    id: Uuid,
    user_email: String,
    biodata_id: Uuid,
    added_at: DateTime<Utc>,
}

impl From<FavouriteRow> for Favourite {
    fn from(row: FavouriteRow) -> Self {
        Favourite {
            id: row.id,
            user_email: row.user_email,
            biodata_id: row.biodata_id,
            added_at: row.added_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_users: i64,
    total_biodatas: i64,
    male_biodatas: i64,
    female_biodatas: i64,
    premium_biodatas: i64,
    pending_contact_requests: i64,
    approved_contact_requests: i64,
    rejected_contact_requests: i64,
}

fn contact_parts(profile: &BiodataProfile) -> (&str, &str) {
    profile
        .contact
        .as_ref()
        .map(|c| (c.contact_email.as_str(), c.mobile_number.as_str()))
        .unwrap_or(("", ""))
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// PostgreSQL-backed profile store
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "INSERT INTO users (id, email, uid, name, photo_url) ",
            "VALUES ($1, $2, $3, $4, $5) ",
            "ON CONFLICT (email) DO NOTHING ",
            "RETURNING ",
            user_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.uid)
        .bind(&user.name)
        .bind(&user.photo_url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn set_user_role(&self, email: &str, role: Role) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE email = $1 RETURNING ",
            user_columns!()
        ))
        .bind(email)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn set_user_premium(&self, email: &str, is_premium: bool) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "UPDATE users SET is_premium = $2, updated_at = NOW() WHERE email = $1 RETURNING ",
            user_columns!()
        ))
        .bind(email)
        .bind(is_premium)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn upsert_user_premium(&self, email: &str, is_premium: bool) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "INSERT INTO users (id, email, is_premium) VALUES ($1, $2, $3) ",
            "ON CONFLICT (email) DO UPDATE SET is_premium = EXCLUDED.is_premium, updated_at = NOW() ",
            "RETURNING ",
            user_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(is_premium)
        .fetch_one(&self.pool)
        .await?;

        User::try_from(row)
    }

    async fn insert_biodata(&self, biodata: NewBiodata) -> StoreResult<Option<Biodata>> {
        let profile = &biodata.profile;
        let (contact_email, mobile_number) = contact_parts(profile);

        let row = sqlx::query_as::<_, BiodataRow>(concat!(
            "INSERT INTO members (id, email, biodata_type, name, dob, height, weight, age, ",
            "occupation, race, father_name, mother_name, permanent_division, present_division, ",
            "partner_age, partner_height, partner_weight, contact_email, mobile_number, ",
            "marital_status, profile_image, is_premium) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, ",
            "$17, $18, $19, $20, $21, $22) ",
            "ON CONFLICT (email) DO NOTHING ",
            "RETURNING ",
            biodata_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(&biodata.email)
        .bind(profile.biodata_type.as_str())
        .bind(&profile.name)
        .bind(profile.dob)
        .bind(&profile.height)
        .bind(&profile.weight)
        .bind(profile.age)
        .bind(&profile.occupation)
        .bind(&profile.race)
        .bind(&profile.father_name)
        .bind(&profile.mother_name)
        .bind(&profile.permanent_division)
        .bind(&profile.present_division)
        .bind(&profile.partner_age)
        .bind(&profile.partner_height)
        .bind(&profile.partner_weight)
        .bind(contact_email)
        .bind(mobile_number)
        .bind(&profile.marital_status)
        .bind(&profile.profile_image)
        .bind(biodata.is_premium)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Biodata::try_from).transpose()
    }

    async fn find_biodata(&self, id: Uuid) -> StoreResult<Option<Biodata>> {
        let row = sqlx::query_as::<_, BiodataRow>(concat!(
            "SELECT ",
            biodata_columns!(),
            " FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Biodata::try_from).transpose()
    }

    async fn find_biodata_by_email(&self, email: &str) -> StoreResult<Option<Biodata>> {
        let row = sqlx::query_as::<_, BiodataRow>(concat!(
            "SELECT ",
            biodata_columns!(),
            " FROM members WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Biodata::try_from).transpose()
    }

    async fn list_biodatas(
        &self,
        filter: &BiodataFilter,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<Biodata>, i64)> {
        let biodata_type = filter.biodata_type.map(|t| t.as_str());

        let rows = sqlx::query_as::<_, BiodataRow>(concat!(
            "SELECT ",
            biodata_columns!(),
            " FROM members ",
            biodata_filter!(),
            " ORDER BY created_at ASC, id ASC LIMIT $5 OFFSET $6"
        ))
        .bind(biodata_type)
        .bind(&filter.permanent_division)
        .bind(filter.min_age)
        .bind(filter.max_age)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(concat!(
            "SELECT COUNT(*) FROM members ",
            biodata_filter!()
        ))
        .bind(biodata_type)
        .bind(&filter.permanent_division)
        .bind(filter.min_age)
        .bind(filter.max_age)
        .fetch_one(&self.pool)
        .await?;

        Ok((convert_all(rows)?, total))
    }

    async fn replace_biodata(&self, biodata: &Biodata) -> StoreResult<Option<Biodata>> {
        let profile = &biodata.profile;
        let (contact_email, mobile_number) = contact_parts(profile);

        let row = sqlx::query_as::<_, BiodataRow>(concat!(
            "UPDATE members SET biodata_type = $2, name = $3, dob = $4, height = $5, ",
            "weight = $6, age = $7, occupation = $8, race = $9, father_name = $10, ",
            "mother_name = $11, permanent_division = $12, present_division = $13, ",
            "partner_age = $14, partner_height = $15, partner_weight = $16, ",
            "contact_email = $17, mobile_number = $18, marital_status = $19, ",
            "profile_image = $20, is_premium = $21, updated_at = NOW() ",
            "WHERE id = $1 RETURNING ",
            biodata_columns!()
        ))
        .bind(biodata.id)
        .bind(profile.biodata_type.as_str())
        .bind(&profile.name)
        .bind(profile.dob)
        .bind(&profile.height)
        .bind(&profile.weight)
        .bind(profile.age)
        .bind(&profile.occupation)
        .bind(&profile.race)
        .bind(&profile.father_name)
        .bind(&profile.mother_name)
        .bind(&profile.permanent_division)
        .bind(&profile.present_division)
        .bind(&profile.partner_age)
        .bind(&profile.partner_height)
        .bind(&profile.partner_weight)
        .bind(contact_email)
        .bind(mobile_number)
        .bind(&profile.marital_status)
        .bind(&profile.profile_image)
        .bind(biodata.is_premium)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Biodata::try_from).transpose()
    }

    async fn set_biodata_premium(&self, email: &str, is_premium: bool) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE members SET is_premium = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .bind(is_premium)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_biodata(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_contact_request(
        &self,
        requester_email: &str,
        biodata_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Option<ContactRequest>> {
        let row = sqlx::query_as::<_, ContactRequestRow>(concat!(
            "INSERT INTO contact_requests (id, requester_email, requested_biodata_id, status, created_at) ",
            "VALUES ($1, $2, $3, 'pending', $4) ",
            "ON CONFLICT (requester_email, requested_biodata_id) DO NOTHING ",
            "RETURNING ",
            contact_request_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(requester_email)
        .bind(biodata_id)
        .bind(created_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContactRequest::try_from).transpose()
    }

    async fn find_contact_request(&self, id: Uuid) -> StoreResult<Option<ContactRequest>> {
        let row = sqlx::query_as::<_, ContactRequestRow>(concat!(
            "SELECT ",
            contact_request_columns!(),
            " FROM contact_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContactRequest::try_from).transpose()
    }

    async fn list_contact_requests(
        &self,
        status: Option<ContactStatus>,
    ) -> StoreResult<Vec<ContactRequest>> {
        let rows = sqlx::query_as::<_, ContactRequestRow>(concat!(
            "SELECT ",
            contact_request_columns!(),
            " FROM contact_requests WHERE ($1::text IS NULL OR status = $1) ",
            "ORDER BY created_at ASC, id ASC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn list_contact_requests_by_requester(
        &self,
        requester_email: &str,
    ) -> StoreResult<Vec<ContactRequest>> {
        let rows = sqlx::query_as::<_, ContactRequestRow>(concat!(
            "SELECT ",
            contact_request_columns!(),
            " FROM contact_requests WHERE requester_email = $1 ",
            "ORDER BY created_at DESC, id DESC"
        ))
        .bind(requester_email)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn resolve_contact_request(
        &self,
        id: Uuid,
        status: ContactStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ContactRequest>> {
        let row = sqlx::query_as::<_, ContactRequestRow>(concat!(
            "UPDATE contact_requests SET status = $2::text, ",
            "approved_at = CASE WHEN $2::text = 'approved' THEN $3::timestamptz ELSE approved_at END, ",
            "rejected_at = CASE WHEN $2::text = 'rejected' THEN $3::timestamptz ELSE rejected_at END ",
            "WHERE id = $1 AND status = 'pending' RETURNING ",
            contact_request_columns!()
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContactRequest::try_from).transpose()
    }

    async fn insert_favourite(
        &self,
        user_email: &str,
        biodata_id: Uuid,
        added_at: DateTime<Utc>,
    ) -> StoreResult<Option<Favourite>> {
        let row = sqlx::query_as::<_, FavouriteRow>(
            "INSERT INTO favourites (id, user_email, biodata_id, added_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_email, biodata_id) DO NOTHING \
             RETURNING id, user_email, biodata_id, added_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_email)
        .bind(biodata_id)
        .bind(added_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Favourite::from))
    }

    async fn list_favourites(&self, user_email: &str) -> StoreResult<Vec<Favourite>> {
        let rows = sqlx::query_as::<_, FavouriteRow>(
            "SELECT id, user_email, biodata_id, added_at FROM favourites \
             WHERE user_email = $1 ORDER BY added_at DESC, id DESC",
        )
        .bind(user_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Favourite::from).collect())
    }

    async fn delete_favourite(&self, id: Uuid, user_email: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM favourites WHERE id = $1 AND user_email = $2")
            .bind(id)
            .bind(user_email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_success_counters(&self) -> StoreResult<Vec<serde_json::Value>> {
        let documents = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT document FROM success_counters ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT \
               (SELECT COUNT(*) FROM users) AS total_users, \
               (SELECT COUNT(*) FROM members) AS total_biodatas, \
               (SELECT COUNT(*) FROM members WHERE biodata_type = 'Male') AS male_biodatas, \
               (SELECT COUNT(*) FROM members WHERE biodata_type = 'Female') AS female_biodatas, \
               (SELECT COUNT(*) FROM members WHERE is_premium IS TRUE) AS premium_biodatas, \
               (SELECT COUNT(*) FROM contact_requests WHERE status = 'pending') AS pending_contact_requests, \
               (SELECT COUNT(*) FROM contact_requests WHERE status = 'approved') AS approved_contact_requests, \
               (SELECT COUNT(*) FROM contact_requests WHERE status = 'rejected') AS rejected_contact_requests",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_users: row.total_users,
            total_biodatas: row.total_biodatas,
            male_biodatas: row.male_biodatas,
            female_biodatas: row.female_biodatas,
            premium_biodatas: row.premium_biodatas,
            pending_contact_requests: row.pending_contact_requests,
            approved_contact_requests: row.approved_contact_requests,
            rejected_contact_requests: row.rejected_contact_requests,
        })
    }
}
