pub mod member_service;
pub mod payment_service;
pub mod plan_service;
pub mod stats_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::repository::*;
use member_service::MemberService;
use payment_service::PaymentService;
use plan_service::PlanService;
use stats_service::StatsService;

pub use member_service::MemberStatusView;
pub use payment_service::{PaymentResult, ReversalResult};
pub use stats_service::DashboardStats;

pub struct ServiceContext {
    pub member_repo: Arc<dyn MemberRepository>,
    pub plan_repo: Arc<dyn PlanRepository>,
    pub plan_history_repo: Arc<dyn PlanHistoryRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub task_repo: Arc<dyn TaskRepository>,
    pub member_service: Arc<MemberService>,
    pub plan_service: Arc<PlanService>,
    pub payment_service: Arc<PaymentService>,
    pub stats_service: Arc<StatsService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool) -> Self {
        let member_repo: Arc<dyn MemberRepository> =
            Arc::new(SqliteMemberRepository::new(db_pool.clone()));
        let plan_repo: Arc<dyn PlanRepository> =
            Arc::new(SqlitePlanRepository::new(db_pool.clone()));
        let plan_history_repo: Arc<dyn PlanHistoryRepository> =
            Arc::new(SqlitePlanHistoryRepository::new(db_pool.clone()));
        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(db_pool.clone()));
        let task_repo: Arc<dyn TaskRepository> =
            Arc::new(SqliteTaskRepository::new(db_pool.clone()));

        let member_service = Arc::new(MemberService::new(
            member_repo.clone(),
            plan_history_repo.clone(),
        ));
        let plan_service = Arc::new(PlanService::new(plan_repo.clone()));
        let payment_service = Arc::new(PaymentService::new(
            db_pool.clone(),
            member_repo.clone(),
            plan_repo.clone(),
            plan_history_repo.clone(),
            payment_repo.clone(),
        ));
        let stats_service = Arc::new(StatsService::new(db_pool.clone()));

        Self {
            member_repo,
            plan_repo,
            plan_history_repo,
            payment_repo,
            task_repo,
            member_service,
            plan_service,
            payment_service,
            stats_service,
            db_pool,
        }
    }
}
