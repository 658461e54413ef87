use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        attribute_payment, compute_expiry, Payment, PaymentMethod, Plan, PlanAttribution,
        PlanHistory, PlanStatus, PlanType, RecordPaymentRequest,
    },
    error::{AppError, Result},
    repository::{MemberRepository, PaymentRepository, PlanHistoryRepository, PlanRepository},
};

/// Outcome of recording a payment: the plan period(s) opened and the single
/// ledger entry that paid for them. `due_date` is the membership period's
/// due date when one was created, otherwise the personal-training one.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResult {
    pub plan_histories: Vec<PlanHistory>,
    pub payment: Payment,
    pub due_date: Option<DateTime<Utc>>,
}

/// Outcome of reversing a plan period: the removed row and the compensating
/// refund entry that keeps the ledger reconcilable.
#[derive(Debug, Clone, Serialize)]
pub struct ReversalResult {
    pub deleted: PlanHistory,
    pub refund: Payment,
}

/// Orchestrates the write side of the plan lifecycle: recording payments
/// (opening plan periods) and reversing plan periods (closing them with a
/// compensating refund).
///
/// Owns the pool so each operation's writes run inside one transaction;
/// concurrent conflicting submissions for the same member are resolved by
/// the store's transactional isolation, not by application-level locking.
pub struct PaymentService {
    pool: SqlitePool,
    member_repo: Arc<dyn MemberRepository>,
    plan_repo: Arc<dyn PlanRepository>,
    plan_history_repo: Arc<dyn PlanHistoryRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
}

impl PaymentService {
    pub fn new(
        pool: SqlitePool,
        member_repo: Arc<dyn MemberRepository>,
        plan_repo: Arc<dyn PlanRepository>,
        plan_history_repo: Arc<dyn PlanHistoryRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            pool,
            member_repo,
            plan_repo,
            plan_history_repo,
            payment_repo,
        }
    }

    /// Record a payment for one or both plan kinds.
    ///
    /// Opens a plan-history row per selected plan, refreshes the member's
    /// active-plan pointer when a membership period was opened and none was
    /// running, and appends exactly one ledger entry for the full amount,
    /// dated now rather than at the period's start date.
    pub async fn record_payment(
        &self,
        member_id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<PaymentResult> {
        if request.membership_plan_id.is_none() && request.personal_training_plan_id.is_none() {
            return Err(AppError::Validation("No plan selected".to_string()));
        }
        if request.amount_cents < 0 {
            return Err(AppError::Validation(
                "Amount cannot be negative; refunds are created by deleting plan history"
                    .to_string(),
            ));
        }

        self.member_repo
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let now = Utc::now();
        let start_date = request
            .start_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::Validation("Invalid start date".to_string()))?
            .and_utc();

        // Resolve both selections against the catalog and the member's
        // current periods before opening the write transaction.
        let mut pending: Vec<(Plan, Option<PlanHistory>)> = Vec::new();
        for plan_id in [request.membership_plan_id, request.personal_training_plan_id]
            .into_iter()
            .flatten()
        {
            let plan = self
                .plan_repo
                .find_by_id(plan_id)
                .await?
                .filter(|p| !p.is_deleted)
                .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

            if plan.status == PlanStatus::Inactive {
                return Err(AppError::BadRequest(format!(
                    "Plan '{}' is not available for purchase",
                    plan.name
                )));
            }

            let existing = self
                .plan_history_repo
                .find_active(member_id, plan.plan_type, now)
                .await?;

            if let Some(ref current) = existing {
                if start_date <= current.due_date {
                    return Err(AppError::Overlap {
                        plan_type: plan.plan_type,
                        due_date: current.due_date,
                    });
                }
            }

            pending.push((plan, existing));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut plan_histories = Vec::new();
        let mut membership_due = None;
        let mut training_due = None;

        for (plan, existing) in pending {
            let expiry = compute_expiry(start_date, plan.duration_days, now);
            let row = Self::insert_plan_history(
                &mut tx,
                member_id,
                &plan,
                start_date,
                expiry.expiry_date,
                now,
            )
            .await?;

            if plan.plan_type == PlanType::MembershipPlan {
                membership_due = Some(row.due_date);
                // Refresh the pointer when no membership period was running,
                // or when the one on record has already lapsed. The second
                // clause is redundant with the active lookup above; it is
                // the recorded behavior and is kept as such.
                let refresh = match existing {
                    None => true,
                    Some(ref current) => current.due_date < now,
                };
                if refresh {
                    Self::set_active_plan(&mut tx, member_id, Some(row.id), now).await?;
                }
            } else {
                training_due = Some(row.due_date);
            }

            plan_histories.push(row);
        }

        let method = request.payment_method.unwrap_or(PaymentMethod::Cash);
        let payment =
            Self::insert_payment(&mut tx, member_id, request.amount_cents, now, method).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            member_id = %member_id,
            payment_id = %payment.id,
            amount_cents = payment.amount_cents,
            periods = plan_histories.len(),
            "Recorded payment"
        );

        Ok(PaymentResult {
            plan_histories,
            payment,
            due_date: membership_due.or(training_due),
        })
    }

    /// Reverse a plan period: remove the history row and append a
    /// compensating refund entry, as one atomic unit.
    ///
    /// When the deleted row is the one the member's active-plan pointer
    /// references, the pointer is cleared in the same transaction; the
    /// refund and the deletion share a failure domain by design of the
    /// transaction boundary.
    pub async fn delete_plan_history(&self, plan_history_id: Uuid) -> Result<ReversalResult> {
        let row = self
            .plan_history_repo
            .find_by_id(plan_history_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan history not found".to_string()))?;

        let now = Utc::now();
        let is_active_period = row.contains(now);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if is_active_period && row.plan_type == PlanType::MembershipPlan {
            // Expected to clear at most one member, but sweep every pointer
            // at this row so none is left dangling.
            Self::clear_active_plan_pointing_at(&mut tx, row.id, now).await?;
        }

        let refund = Self::insert_payment(
            &mut tx,
            row.member_id,
            -row.amount_cents,
            now,
            PaymentMethod::Refund,
        )
        .await?;

        sqlx::query("DELETE FROM plan_history WHERE id = ?")
            .bind(row.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            member_id = %row.member_id,
            plan_history_id = %row.id,
            refund_cents = refund.amount_cents,
            "Reversed plan period"
        );

        Ok(ReversalResult {
            deleted: row,
            refund,
        })
    }

    /// Attribute a ledger entry to the plan kind(s) it paid for, via the
    /// widening-window heuristic over the member's plan history.
    pub async fn classify_payment(&self, payment_id: Uuid) -> Result<PlanAttribution> {
        let payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        let history = self
            .plan_history_repo
            .find_by_member(payment.member_id)
            .await?;

        Ok(attribute_payment(payment.date, &history))
    }

    async fn insert_plan_history(
        conn: &mut SqliteConnection,
        member_id: Uuid,
        plan: &Plan,
        start_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<PlanHistory> {
        let row = PlanHistory {
            id: Uuid::new_v4(),
            member_id,
            plan_id: plan.id,
            plan_name: plan.name.clone(),
            plan_type: plan.plan_type,
            amount_cents: plan.amount_cents,
            start_date,
            due_date,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO plan_history (
                id, member_id, plan_id, plan_name, plan_type,
                amount_cents, start_date, due_date, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.id.to_string())
        .bind(row.member_id.to_string())
        .bind(row.plan_id.to_string())
        .bind(&row.plan_name)
        .bind(row.plan_type.as_str())
        .bind(row.amount_cents)
        .bind(row.start_date.naive_utc())
        .bind(row.due_date.naive_utc())
        .bind(row.created_at.naive_utc())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row)
    }

    async fn insert_payment(
        conn: &mut SqliteConnection,
        member_id: Uuid,
        amount_cents: i64,
        date: DateTime<Utc>,
        method: PaymentMethod,
    ) -> Result<Payment> {
        let payment = Payment {
            id: Uuid::new_v4(),
            member_id,
            amount_cents,
            date,
            payment_method: method,
            created_at: date,
        };

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, member_id, amount_cents, date, payment_method, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.member_id.to_string())
        .bind(payment.amount_cents)
        .bind(payment.date.naive_utc())
        .bind(payment.payment_method.as_str())
        .bind(payment.created_at.naive_utc())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(payment)
    }

    async fn set_active_plan(
        conn: &mut SqliteConnection,
        member_id: Uuid,
        plan_history_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE members
            SET active_plan_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(plan_history_id.map(|id| id.to_string()))
        .bind(now.naive_utc())
        .bind(member_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn clear_active_plan_pointing_at(
        conn: &mut SqliteConnection,
        plan_history_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE members
            SET active_plan_id = NULL, updated_at = ?
            WHERE active_plan_id = ?
            "#,
        )
        .bind(now.naive_utc())
        .bind(plan_history_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
