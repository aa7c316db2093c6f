//! User Model
//!
//! Account records and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account role. Only admins may moderate other accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User account as stored and returned by the API
///
/// The email is the natural key and is always stored lower-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Normalized email address (unique)
    pub email: String,

    /// Identity provider subject, absent for admin-provisioned accounts
    pub uid: Option<String>,

    pub name: Option<String>,

    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,

    pub role: Role,

    /// Source of truth for premium status
    pub is_premium: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields needed to insert a new user; role and premium start at their defaults
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub uid: Option<String>,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}
