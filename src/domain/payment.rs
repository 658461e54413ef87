use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single ledger entry. Amounts are signed: a negative amount is a refund
/// inserted when a plan period is reversed. Rows are append-only; corrections
/// happen through compensating entries, never edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount_cents: i64,
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

/// A front-desk payment submission. At least one plan must be selected;
/// membership and personal-training selections are processed independently
/// within the same call.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPaymentRequest {
    pub membership_plan_id: Option<Uuid>,
    pub personal_training_plan_id: Option<Uuid>,
    /// First day of the purchased period, anchored at midnight UTC.
    pub start_date: NaiveDate,
    pub amount_cents: i64,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Both,
    Refund,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Both => "both",
            PaymentMethod::Refund => "refund",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "bank" => Some(PaymentMethod::Bank),
            "both" => Some(PaymentMethod::Both),
            "refund" => Some(PaymentMethod::Refund),
            _ => None,
        }
    }
}
