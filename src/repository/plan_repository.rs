use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreatePlanRequest, Plan, PlanStatus, PlanType, UpdatePlanRequest},
    error::{AppError, Result},
    repository::PlanRepository,
};

#[derive(FromRow)]
struct PlanRow {
    id: String,
    name: String,
    duration_days: i64,
    amount_cents: i64,
    plan_type: String,
    status: String,
    is_deleted: i32,
    deleted_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqlitePlanRepository {
    pool: SqlitePool,
}

impl SqlitePlanRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_plan(row: PlanRow) -> Result<Plan> {
        Ok(Plan {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            duration_days: row.duration_days,
            amount_cents: row.amount_cents,
            plan_type: PlanType::from_str(&row.plan_type)
                .ok_or_else(|| AppError::Database(format!("Invalid plan type: {}", row.plan_type)))?,
            status: PlanStatus::from_str(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid plan status: {}", row.status)))?,
            is_deleted: row.is_deleted != 0,
            deleted_at: row
                .deleted_at
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl PlanRepository for SqlitePlanRepository {
    async fn create(&self, request: CreatePlanRequest) -> Result<Plan> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO plans (
                id, name, duration_days, amount_cents, plan_type,
                status, is_deleted, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 'active', 0, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.name)
        .bind(request.duration_days)
        .bind(request.amount_cents)
        .bind(request.plan_type.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created plan".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Plan>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, name, duration_days, amount_cents, plan_type,
                   status, is_deleted, deleted_at, created_at, updated_at
            FROM plans
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_plan(r)?)),
            None => Ok(None),
        }
    }

    async fn find_live_by_name(&self, name: &str) -> Result<Option<Plan>> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, name, duration_days, amount_cents, plan_type,
                   status, is_deleted, deleted_at, created_at, updated_at
            FROM plans
            WHERE name = ? AND is_deleted = 0
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_plan(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<Plan>> {
        let query = if include_deleted {
            r#"
            SELECT id, name, duration_days, amount_cents, plan_type,
                   status, is_deleted, deleted_at, created_at, updated_at
            FROM plans
            ORDER BY name ASC
            "#
        } else {
            r#"
            SELECT id, name, duration_days, amount_cents, plan_type,
                   status, is_deleted, deleted_at, created_at, updated_at
            FROM plans
            WHERE is_deleted = 0
            ORDER BY name ASC
            "#
        };

        let rows = sqlx::query_as::<_, PlanRow>(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_plan).collect()
    }

    async fn update(&self, id: Uuid, update: UpdatePlanRequest) -> Result<Plan> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        let status_str = update
            .status
            .as_ref()
            .unwrap_or(&existing.status)
            .as_str();

        sqlx::query(
            r#"
            UPDATE plans
            SET name = COALESCE(?, name),
                duration_days = COALESCE(?, duration_days),
                amount_cents = COALESCE(?, amount_cents),
                status = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(update.duration_days)
        .bind(update.amount_cents)
        .bind(status_str)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated plan".to_string()))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE plans
            SET is_deleted = 1, deleted_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn count_history_usage(&self, id: Uuid) -> Result<i64> {
        let id_str = id.to_string();

        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) as count
            FROM plan_history
            WHERE plan_id = ?
            "#,
        )
        .bind(&id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0)
    }
}
