use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod member_repository;
pub mod payment_repository;
pub mod plan_history_repository;
pub mod plan_repository;
pub mod task_repository;

pub use member_repository::SqliteMemberRepository;
pub use payment_repository::SqlitePaymentRepository;
pub use plan_history_repository::SqlitePlanHistoryRepository;
pub use plan_repository::SqlitePlanRepository;
pub use task_repository::SqliteTaskRepository;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, request: CreateMemberRequest) -> Result<Member>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Member>>;
    async fn update(&self, id: Uuid, update: UpdateMemberRequest) -> Result<Member>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn create(&self, request: CreatePlanRequest) -> Result<Plan>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Plan>>;
    /// Lookup by name among plans that have not been soft-deleted.
    async fn find_live_by_name(&self, name: &str) -> Result<Option<Plan>>;
    async fn list(&self, include_deleted: bool) -> Result<Vec<Plan>>;
    async fn update(&self, id: Uuid, update: UpdatePlanRequest) -> Result<Plan>;
    async fn soft_delete(&self, id: Uuid) -> Result<()>;
    async fn count_history_usage(&self, id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait PlanHistoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlanHistory>>;
    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<PlanHistory>>;
    /// The most recent row of the given type whose interval contains `as_of`.
    async fn find_active(
        &self,
        member_id: Uuid,
        plan_type: PlanType,
        as_of: DateTime<Utc>,
    ) -> Result<Option<PlanHistory>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Payment>>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<Payment>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, request: CreateTaskRequest) -> Result<Task>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>>;
    async fn list(&self) -> Result<Vec<Task>>;
    async fn update(&self, id: Uuid, update: UpdateTaskRequest) -> Result<Task>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}
