use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{PlanHistory, PlanType},
    error::{AppError, Result},
    repository::PlanHistoryRepository,
};

// Rows are inserted and deleted by PaymentService inside its transactions;
// this repository covers the read paths.
#[derive(FromRow)]
struct PlanHistoryRow {
    id: String,
    member_id: String,
    plan_id: String,
    plan_name: String,
    plan_type: String,
    amount_cents: i64,
    start_date: NaiveDateTime,
    due_date: NaiveDateTime,
    created_at: NaiveDateTime,
}

pub struct SqlitePlanHistoryRepository {
    pool: SqlitePool,
}

impl SqlitePlanHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_history(row: PlanHistoryRow) -> Result<PlanHistory> {
        Ok(PlanHistory {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            member_id: Uuid::parse_str(&row.member_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            plan_id: Uuid::parse_str(&row.plan_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            plan_name: row.plan_name,
            plan_type: PlanType::from_str(&row.plan_type)
                .ok_or_else(|| AppError::Database(format!("Invalid plan type: {}", row.plan_type)))?,
            amount_cents: row.amount_cents,
            start_date: DateTime::from_naive_utc_and_offset(row.start_date, Utc),
            due_date: DateTime::from_naive_utc_and_offset(row.due_date, Utc),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl PlanHistoryRepository for SqlitePlanHistoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlanHistory>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, PlanHistoryRow>(
            r#"
            SELECT id, member_id, plan_id, plan_name, plan_type,
                   amount_cents, start_date, due_date, created_at
            FROM plan_history
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_history(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<PlanHistory>> {
        let member_id_str = member_id.to_string();
        let rows = sqlx::query_as::<_, PlanHistoryRow>(
            r#"
            SELECT id, member_id, plan_id, plan_name, plan_type,
                   amount_cents, start_date, due_date, created_at
            FROM plan_history
            WHERE member_id = ?
            ORDER BY start_date DESC
            "#,
        )
        .bind(member_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_history).collect()
    }

    async fn find_active(
        &self,
        member_id: Uuid,
        plan_type: PlanType,
        as_of: DateTime<Utc>,
    ) -> Result<Option<PlanHistory>> {
        let member_id_str = member_id.to_string();
        let as_of_naive = as_of.naive_utc();

        let row = sqlx::query_as::<_, PlanHistoryRow>(
            r#"
            SELECT id, member_id, plan_id, plan_name, plan_type,
                   amount_cents, start_date, due_date, created_at
            FROM plan_history
            WHERE member_id = ?
              AND plan_type = ?
              AND start_date <= ?
              AND due_date >= ?
            ORDER BY due_date DESC
            LIMIT 1
            "#,
        )
        .bind(member_id_str)
        .bind(plan_type.as_str())
        .bind(as_of_naive)
        .bind(as_of_naive)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_history(r)?)),
            None => Ok(None),
        }
    }
}
