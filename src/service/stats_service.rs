use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{classify_plan_status, MemberPlanStatus},
    error::{AppError, Result},
};

/// Aggregates for the admin dashboard. Computed on demand; nothing here is
/// cached or denormalized.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_members: i64,
    pub active_members: i64,
    pub expired_members: i64,
    pub inactive_members: i64,
    pub live_plans: i64,
    pub month_gross_cents: i64,
    pub month_refund_cents: i64,
    pub month_net_cents: i64,
}

#[derive(FromRow)]
struct MemberDueRow {
    due_date: Option<NaiveDateTime>,
}

#[derive(FromRow)]
struct MonthTotalsRow {
    gross_cents: i64,
    refund_cents: i64,
}

pub struct StatsService {
    pool: SqlitePool,
}

impl StatsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let now = Utc::now();
        let today = now.date_naive();

        // One row per member with the due date of the period their
        // active-plan pointer references; classification happens in code so
        // it stays identical to the per-member status read path.
        let rows = sqlx::query_as::<_, MemberDueRow>(
            r#"
            SELECT h.due_date AS due_date
            FROM members m
            LEFT JOIN plan_history h ON h.id = m.active_plan_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let total_members = rows.len() as i64;
        let mut active_members = 0;
        let mut expired_members = 0;
        let mut inactive_members = 0;
        for row in rows {
            let due = row
                .due_date
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc));
            match classify_plan_status(due, today) {
                MemberPlanStatus::Active => active_members += 1,
                MemberPlanStatus::Expired => expired_members += 1,
                MemberPlanStatus::Inactive => inactive_members += 1,
            }
        }

        let live_plans: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM plans WHERE is_deleted = 0 AND status = 'active'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let month_start = today
            .with_day(1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| AppError::Internal("Failed to compute month start".to_string()))?;

        let totals = sqlx::query_as::<_, MonthTotalsRow>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN amount_cents >= 0 THEN amount_cents ELSE 0 END), 0) AS gross_cents,
                COALESCE(SUM(CASE WHEN amount_cents < 0 THEN -amount_cents ELSE 0 END), 0) AS refund_cents
            FROM payments
            WHERE date >= ?
            "#,
        )
        .bind(month_start)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(DashboardStats {
            total_members,
            active_members,
            expired_members,
            inactive_members,
            live_plans: live_plans.0,
            month_gross_cents: totals.gross_cents,
            month_refund_cents: totals.refund_cents,
            month_net_cents: totals.gross_cents - totals.refund_cents,
        })
    }
}
