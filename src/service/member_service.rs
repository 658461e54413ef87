use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{classify_plan_status, compute_expiry, CreateMemberRequest, Member, MemberPlanStatus},
    error::{AppError, Result},
    repository::{MemberRepository, PlanHistoryRepository},
};

/// A member's standing as shown on the roster: the classification plus the
/// due date it was derived from.
#[derive(Debug, Clone, Serialize)]
pub struct MemberStatusView {
    pub member_id: Uuid,
    pub status: MemberPlanStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub days_left: Option<i64>,
}

pub struct MemberService {
    member_repo: Arc<dyn MemberRepository>,
    plan_history_repo: Arc<dyn PlanHistoryRepository>,
}

impl MemberService {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        plan_history_repo: Arc<dyn PlanHistoryRepository>,
    ) -> Self {
        Self {
            member_repo,
            plan_history_repo,
        }
    }

    pub async fn register_member(&self, request: CreateMemberRequest) -> Result<Member> {
        if request.full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }
        if request.email.trim().is_empty() || !request.email.contains('@') {
            return Err(AppError::Validation("A valid email is required".to_string()));
        }

        // Check for duplicate email
        if self.member_repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let member = self.member_repo.create(request).await?;
        tracing::info!(member_id = %member.id, "Registered member");

        Ok(member)
    }

    /// Classify a member's standing from their active-plan pointer.
    ///
    /// The pointer is taken at face value: it is refreshed on writes, not
    /// re-validated here, so a lapsed period reads as expired rather than
    /// silently swapping to some other row.
    pub async fn member_status(&self, member_id: Uuid) -> Result<MemberStatusView> {
        let member = self
            .member_repo
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let now = Utc::now();
        let active_row = match member.active_plan_id {
            Some(id) => self.plan_history_repo.find_by_id(id).await?,
            None => None,
        };

        let due_date = active_row.as_ref().map(|row| row.due_date);
        let status = classify_plan_status(due_date, now.date_naive());
        let days_left = active_row.as_ref().map(|row| {
            let duration_days = (row.due_date - row.start_date).num_days();
            compute_expiry(row.start_date, duration_days, now).days_left
        });

        Ok(MemberStatusView {
            member_id: member.id,
            status,
            due_date,
            days_left,
        })
    }
}
