//! Contact Request Model
//!
//! A premium member's request to see another member's contact details.
//! Requests start `pending` and are resolved once by an admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{biodata::Biodata, user::User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Pending,
    Approved,
    Rejected,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Approved => "approved",
            ContactStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ContactStatus::Pending)
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ContactStatus::Pending),
            "approved" => Ok(ContactStatus::Approved),
            "rejected" => Ok(ContactStatus::Rejected),
            other => Err(format!("unknown contact request status '{}'", other)),
        }
    }
}

/// Admin decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target(&self) -> ContactStatus {
        match self {
            Decision::Approve => ContactStatus::Approved,
            Decision::Reject => ContactStatus::Rejected,
        }
    }
}

/// What applying a decision to a request in a given state does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Pending request moves to the decision's terminal state
    Apply(ContactStatus),
    /// Request already sits in the target state; nothing changes
    AlreadyApplied,
    /// Request was resolved the other way and cannot move again
    Blocked(ContactStatus),
}

impl Transition {
    pub fn plan(current: ContactStatus, decision: Decision) -> Self {
        let target = decision.target();
        if !current.is_terminal() {
            Transition::Apply(target)
        } else if current == target {
            Transition::AlreadyApplied
        } else {
            Transition::Blocked(current)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub requester_email: String,
    pub requested_biodata_id: Uuid,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
}

/// Admin view: the request joined with the biodata and the requester
#[derive(Debug, Clone, Serialize)]
pub struct ContactRequestDetails {
    #[serde(flatten)]
    pub request: ContactRequest,
    pub biodata: Option<Biodata>,
    pub requester: Option<User>,
}

/// Requester view: the biodata is only attached once the request is approved
#[derive(Debug, Clone, Serialize)]
pub struct MyContactRequest {
    #[serde(flatten)]
    pub request: ContactRequest,
    pub biodata: Option<Biodata>,
}
