use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentMethod},
    error::{AppError, Result},
    repository::PaymentRepository,
};

// The ledger is append-only and appends happen only inside PaymentService
// transactions; this repository covers the read paths.
#[derive(FromRow)]
struct PaymentRow {
    id: String,
    member_id: String,
    amount_cents: i64,
    date: NaiveDateTime,
    payment_method: String,
    created_at: NaiveDateTime,
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        Ok(Payment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            member_id: Uuid::parse_str(&row.member_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            amount_cents: row.amount_cents,
            date: DateTime::from_naive_utc_and_offset(row.date, Utc),
            payment_method: PaymentMethod::from_str(&row.payment_method).ok_or_else(|| {
                AppError::Database(format!("Invalid payment method: {}", row.payment_method))
            })?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, member_id, amount_cents, date, payment_method, created_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Payment>> {
        let member_id_str = member_id.to_string();
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, member_id, amount_cents, date, payment_method, created_at
            FROM payments
            WHERE member_id = ?
            ORDER BY date DESC
            "#,
        )
        .bind(member_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, member_id, amount_cents, date, payment_method, created_at
            FROM payments
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }
}
