use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PlanType;

/// One concrete, time-bounded assignment of a plan to a member.
///
/// The plan's name, type, and price are captured at purchase time so history
/// rows keep rendering after the catalog entry is renamed or soft-deleted,
/// and so a reversal can compute its refund without the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanHistory {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub plan_type: PlanType,
    pub amount_cents: i64,
    pub start_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PlanHistory {
    /// Whether the period's closed interval [start_date, due_date] contains
    /// the given instant.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant <= self.due_date
    }
}
