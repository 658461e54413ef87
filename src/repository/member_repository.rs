use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateMemberRequest, Member, UpdateMemberRequest},
    error::{AppError, Result},
    repository::MemberRepository,
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct MemberRow {
    id: String,
    full_name: String,
    email: String,
    phone: Option<String>,
    joined_at: NaiveDateTime,
    active_plan_id: Option<String>,
    notes: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_member(row: MemberRow) -> Result<Member> {
        Ok(Member {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            joined_at: DateTime::from_naive_utc_and_offset(row.joined_at, Utc),
            active_plan_id: row
                .active_plan_id
                .map(|id| Uuid::parse_str(&id).map_err(|e| AppError::Database(e.to_string())))
                .transpose()?,
            notes: row.notes,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn create(&self, request: CreateMemberRequest) -> Result<Member> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO members (
                id, full_name, email, phone, joined_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.full_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created member".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, full_name, email, phone, joined_at, active_plan_id,
                   notes, created_at, updated_at
            FROM members
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, full_name, email, phone, joined_at, active_plan_id,
                   notes, created_at, updated_at
            FROM members
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, full_name, email, phone, joined_at, active_plan_id,
                   notes, created_at, updated_at
            FROM members
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateMemberRequest) -> Result<Member> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE members
            SET full_name = COALESCE(?, full_name),
                phone = COALESCE(?, phone),
                notes = COALESCE(?, notes),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.full_name)
        .bind(&update.phone)
        .bind(&update.notes)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated member".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
