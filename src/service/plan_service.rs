use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{CreatePlanRequest, Plan, UpdatePlanRequest},
    error::{AppError, Result},
    repository::PlanRepository,
};

pub struct PlanService {
    repo: Arc<dyn PlanRepository>,
}

impl PlanService {
    pub fn new(repo: Arc<dyn PlanRepository>) -> Self {
        Self { repo }
    }

    /// List catalog plans, optionally including soft-deleted ones
    pub async fn list(&self, include_deleted: bool) -> Result<Vec<Plan>> {
        self.repo.list(include_deleted).await
    }

    /// Get a plan by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<Plan>> {
        self.repo.find_by_id(id).await
    }

    /// Create a new catalog plan
    pub async fn create(&self, request: CreatePlanRequest) -> Result<Plan> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("Plan name is required".to_string()));
        }

        if request.duration_days <= 0 {
            return Err(AppError::BadRequest(
                "Duration must be a positive number of days".to_string(),
            ));
        }

        if request.amount_cents < 0 {
            return Err(AppError::BadRequest("Amount cannot be negative".to_string()));
        }

        // Check for duplicate name among non-deleted plans
        if self.repo.find_live_by_name(&request.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Plan with name '{}' already exists",
                request.name
            )));
        }

        self.repo.create(request).await
    }

    /// Update an existing plan
    pub async fn update(&self, id: Uuid, request: UpdatePlanRequest) -> Result<Plan> {
        if let Some(duration_days) = request.duration_days {
            if duration_days <= 0 {
                return Err(AppError::BadRequest(
                    "Duration must be a positive number of days".to_string(),
                ));
            }
        }

        if let Some(amount_cents) = request.amount_cents {
            if amount_cents < 0 {
                return Err(AppError::BadRequest("Amount cannot be negative".to_string()));
            }
        }

        if let Some(ref name) = request.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Plan name is required".to_string()));
            }
            if let Some(other) = self.repo.find_live_by_name(name).await? {
                if other.id != id {
                    return Err(AppError::Conflict(format!(
                        "Plan with name '{}' already exists",
                        name
                    )));
                }
            }
        }

        self.repo.update(id, request).await
    }

    /// Soft-delete a plan. The row stays behind its deleted flag so history
    /// entries referencing it remain resolvable.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let plan = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        if plan.is_deleted {
            return Err(AppError::BadRequest("Plan is already deleted".to_string()));
        }

        let usage = self.repo.count_history_usage(id).await?;
        if usage > 0 {
            tracing::info!(
                plan_id = %id,
                history_rows = usage,
                "Soft-deleting plan still referenced by history"
            );
        }

        self.repo.soft_delete(id).await
    }
}
