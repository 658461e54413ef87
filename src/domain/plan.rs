use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchasable template: membership or personal-training, priced in
/// currency minor units, with a fixed duration in days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub duration_days: i64,
    pub amount_cents: i64,
    pub plan_type: PlanType,
    pub status: PlanStatus,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    MembershipPlan,
    PersonalTraining,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::MembershipPlan => "membership_plan",
            PlanType::PersonalTraining => "personal_training",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "membership_plan" => Some(PlanType::MembershipPlan),
            "personal_training" => Some(PlanType::PersonalTraining),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanType::MembershipPlan => write!(f, "Membership"),
            PlanType::PersonalTraining => write!(f, "Personal training"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Active,
    Inactive,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(PlanStatus::Active),
            "inactive" => Some(PlanStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    pub duration_days: i64,
    pub amount_cents: i64,
    pub plan_type: PlanType,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub duration_days: Option<i64>,
    pub amount_cents: Option<i64>,
    pub status: Option<PlanStatus>,
}
