use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::MemberPlanStatus;

/// Projection of a plan period forward from its start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanExpiry {
    pub expiry_date: DateTime<Utc>,
    pub days_left: i64,
    pub is_active: bool,
}

/// Compute when a period starting at `start_date` with the given duration
/// expires, and whether it is still running at `now`.
///
/// Durations are always whole days. Callers inject `now` so the result is
/// deterministic.
pub fn compute_expiry(
    start_date: DateTime<Utc>,
    duration_days: i64,
    now: DateTime<Utc>,
) -> PlanExpiry {
    let expiry_date = start_date + Duration::days(duration_days);
    PlanExpiry {
        expiry_date,
        days_left: days_until(now, expiry_date),
        is_active: now <= expiry_date,
    }
}

/// Whole days from `now` until `until`, rounded up. Negative once `until`
/// is more than a day in the past.
fn days_until(now: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    const DAY_SECS: i64 = 24 * 60 * 60;
    let secs = (until - now).num_seconds();
    secs.div_euclid(DAY_SECS) + if secs.rem_euclid(DAY_SECS) != 0 { 1 } else { 0 }
}

/// Classify a member's standing from the due date of the plan-history row
/// their active-plan pointer references.
///
/// The comparison is day-granular: the due date counts in full, so a plan
/// due today is still active regardless of time of day.
pub fn classify_plan_status(due_date: Option<DateTime<Utc>>, today: NaiveDate) -> MemberPlanStatus {
    match due_date {
        None => MemberPlanStatus::Inactive,
        Some(due) => {
            if due.date_naive() >= today {
                MemberPlanStatus::Active
            } else {
                MemberPlanStatus::Expired
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn expiry_is_start_plus_duration() {
        let start = utc(2025, 1, 1, 0);
        let result = compute_expiry(start, 30, utc(2025, 1, 15, 0));
        assert_eq!(result.expiry_date, utc(2025, 1, 31, 0));
        assert_eq!(result.expiry_date - start, Duration::days(30));
    }

    #[test]
    fn active_iff_now_not_past_expiry() {
        let start = utc(2025, 1, 1, 0);
        assert!(compute_expiry(start, 30, utc(2025, 1, 15, 0)).is_active);
        assert!(compute_expiry(start, 30, utc(2025, 1, 31, 0)).is_active);
        assert!(!compute_expiry(start, 30, utc(2025, 2, 1, 0)).is_active);
    }

    #[test]
    fn days_left_rounds_up_partial_days() {
        let start = utc(2025, 1, 1, 0);
        // 15 full days plus a 12-hour remainder counts as 16.
        let result = compute_expiry(start, 30, utc(2025, 1, 15, 12));
        assert_eq!(result.days_left, 16);
        // Exactly at expiry: nothing left.
        assert_eq!(compute_expiry(start, 30, utc(2025, 1, 31, 0)).days_left, 0);
        // A day and a half past expiry.
        assert_eq!(compute_expiry(start, 30, utc(2025, 2, 1, 12)).days_left, -1);
    }

    #[test]
    fn no_due_date_is_inactive() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(classify_plan_status(None, today), MemberPlanStatus::Inactive);
    }

    #[test]
    fn due_date_today_or_later_is_active() {
        let due = utc(2025, 1, 31, 0);
        let mid_period = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let due_day = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(classify_plan_status(Some(due), mid_period), MemberPlanStatus::Active);
        assert_eq!(classify_plan_status(Some(due), due_day), MemberPlanStatus::Active);
        assert_eq!(classify_plan_status(Some(due), after), MemberPlanStatus::Expired);
    }
}
