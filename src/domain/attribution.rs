use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlanHistory, PlanType};

/// Which kind of plan a ledger entry paid for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanAttribution {
    Membership,
    PersonalTraining,
    Both,
    #[serde(rename = "N/A")]
    NotApplicable,
}

/// Attribute a payment to the plan period(s) it funded.
///
/// Payments carry no foreign key to the history rows they paid for; the two
/// are correlated by temporal proximity instead. Windows widen until one
/// yields at least a match: start date within an hour of the payment, then
/// the same calendar day, then within seven days. When nothing matches, fall
/// back to whichever plan types appear anywhere in the member's history.
///
/// Best-effort only: two purchases in rapid succession can land in each
/// other's windows and be misattributed.
pub fn attribute_payment(
    payment_date: DateTime<Utc>,
    history: &[PlanHistory],
) -> PlanAttribution {
    const HOUR_SECS: i64 = 60 * 60;
    const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

    let within_hour = |h: &PlanHistory| {
        (h.start_date - payment_date).num_seconds().abs() <= HOUR_SECS
    };
    let same_day =
        |h: &PlanHistory| h.start_date.date_naive() == payment_date.date_naive();
    let within_week = |h: &PlanHistory| {
        (h.start_date - payment_date).num_seconds().abs() <= WEEK_SECS
    };

    let windows: [&dyn Fn(&PlanHistory) -> bool; 3] = [&within_hour, &same_day, &within_week];
    for in_window in windows {
        let matched = history.iter().filter(|h| in_window(h)).map(|h| h.plan_type);
        if let Some(attribution) = attribution_of(matched) {
            return attribution;
        }
    }

    attribution_of(history.iter().map(|h| h.plan_type))
        .unwrap_or(PlanAttribution::NotApplicable)
}

fn attribution_of(types: impl Iterator<Item = PlanType>) -> Option<PlanAttribution> {
    let mut membership = false;
    let mut personal_training = false;
    for plan_type in types {
        match plan_type {
            PlanType::MembershipPlan => membership = true,
            PlanType::PersonalTraining => personal_training = true,
        }
    }
    match (membership, personal_training) {
        (true, true) => Some(PlanAttribution::Both),
        (true, false) => Some(PlanAttribution::Membership),
        (false, true) => Some(PlanAttribution::PersonalTraining),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn history_row(plan_type: PlanType, start_date: DateTime<Utc>) -> PlanHistory {
        PlanHistory {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            plan_name: "Test plan".to_string(),
            plan_type,
            amount_cents: 5000,
            start_date,
            due_date: start_date + Duration::days(30),
            created_at: start_date,
        }
    }

    fn paid_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap()
    }

    #[test]
    fn prefers_the_hour_window_over_wider_ones() {
        let history = vec![
            history_row(PlanType::MembershipPlan, paid_at() + Duration::minutes(20)),
            // Same day but outside the hour window; must not dilute the match.
            history_row(PlanType::PersonalTraining, paid_at() + Duration::hours(6)),
        ];
        assert_eq!(
            attribute_payment(paid_at(), &history),
            PlanAttribution::Membership
        );
    }

    #[test]
    fn mixed_types_in_one_window_report_both() {
        let history = vec![
            history_row(PlanType::MembershipPlan, paid_at() + Duration::minutes(5)),
            history_row(PlanType::PersonalTraining, paid_at() - Duration::minutes(30)),
        ];
        assert_eq!(attribute_payment(paid_at(), &history), PlanAttribution::Both);
    }

    #[test]
    fn falls_through_to_same_day_then_week() {
        let same_day = vec![history_row(
            PlanType::PersonalTraining,
            paid_at() + Duration::hours(8),
        )];
        assert_eq!(
            attribute_payment(paid_at(), &same_day),
            PlanAttribution::PersonalTraining
        );

        let same_week = vec![history_row(
            PlanType::MembershipPlan,
            paid_at() + Duration::days(3),
        )];
        assert_eq!(
            attribute_payment(paid_at(), &same_week),
            PlanAttribution::Membership
        );
    }

    #[test]
    fn global_fallback_reports_both_types_ever_held() {
        // Nothing within seven days, but the member has held both plan
        // types at some point.
        let history = vec![
            history_row(PlanType::MembershipPlan, paid_at() - Duration::days(200)),
            history_row(PlanType::PersonalTraining, paid_at() + Duration::days(90)),
        ];
        assert_eq!(attribute_payment(paid_at(), &history), PlanAttribution::Both);
    }

    #[test]
    fn no_history_is_not_applicable() {
        assert_eq!(
            attribute_payment(paid_at(), &[]),
            PlanAttribution::NotApplicable
        );
    }
}
