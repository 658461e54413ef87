use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub joined_at: DateTime<Utc>,
    /// Denormalized pointer to the currently-effective membership-type
    /// plan-history row. Refreshed opportunistically when a payment is
    /// recorded, cleared when the pointed-at row is reversed; not
    /// re-validated on every read.
    pub active_plan_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership standing derived from the active-plan pointer's due date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberPlanStatus {
    Active,
    Inactive,
    Expired,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemberRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateMemberRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}
