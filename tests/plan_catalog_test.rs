use chrono::Utc;
use sqlx::SqlitePool;

use liftdesk::{
    domain::{
        CreateMemberRequest, CreatePlanRequest, PlanStatus, PlanType, RecordPaymentRequest,
        UpdatePlanRequest,
    },
    error::AppError,
    service::ServiceContext,
};

async fn setup() -> anyhow::Result<ServiceContext> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(ServiceContext::new(pool))
}

fn monthly_request() -> CreatePlanRequest {
    CreatePlanRequest {
        name: "Monthly".to_string(),
        duration_days: 30,
        amount_cents: 4_900,
        plan_type: PlanType::MembershipPlan,
    }
}

#[tokio::test]
async fn plan_crud_and_soft_delete() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let plan = ctx.plan_service.create(monthly_request()).await?;
    assert_eq!(plan.status, PlanStatus::Active);
    assert!(!plan.is_deleted);

    let found = ctx.plan_service.get(plan.id).await?;
    assert!(found.is_some());

    let renamed = ctx
        .plan_service
        .update(
            plan.id,
            UpdatePlanRequest {
                name: Some("Monthly Unlimited".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(renamed.name, "Monthly Unlimited");

    ctx.plan_service.delete(plan.id).await?;

    // Soft-deleted: gone from the default listing, still resolvable by id
    let listed = ctx.plan_service.list(false).await?;
    assert!(listed.is_empty());
    let with_deleted = ctx.plan_service.list(true).await?;
    assert_eq!(with_deleted.len(), 1);
    let deleted = ctx.plan_service.get(plan.id).await?.unwrap();
    assert!(deleted.is_deleted);
    assert!(deleted.deleted_at.is_some());

    // Deleting twice is rejected
    let err = ctx.plan_service.delete(plan.id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn duplicate_names_are_rejected_until_the_holder_is_deleted() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let original = ctx.plan_service.create(monthly_request()).await?;

    let err = ctx.plan_service.create(monthly_request()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The name frees up once the original is soft-deleted
    ctx.plan_service.delete(original.id).await?;
    let replacement = ctx.plan_service.create(monthly_request()).await?;
    assert_ne!(replacement.id, original.id);

    Ok(())
}

#[tokio::test]
async fn invalid_plan_definitions_are_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let err = ctx
        .plan_service
        .create(CreatePlanRequest {
            duration_days: 0,
            ..monthly_request()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = ctx
        .plan_service
        .create(CreatePlanRequest {
            amount_cents: -100,
            ..monthly_request()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = ctx
        .plan_service
        .create(CreatePlanRequest {
            name: "  ".to_string(),
            ..monthly_request()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn deleted_and_inactive_plans_cannot_be_purchased() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let member = ctx
        .member_service
        .register_member(CreateMemberRequest {
            full_name: "Test Member".to_string(),
            email: "member@example.com".to_string(),
            phone: None,
        })
        .await?;

    let plan = ctx.plan_service.create(monthly_request()).await?;
    ctx.plan_service.delete(plan.id).await?;

    let err = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(plan.id),
                personal_training_plan_id: None,
                start_date: Utc::now().date_naive(),
                amount_cents: plan.amount_cents,
                payment_method: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let retired = ctx
        .plan_service
        .create(CreatePlanRequest {
            name: "Legacy".to_string(),
            ..monthly_request()
        })
        .await?;
    ctx.plan_service
        .update(
            retired.id,
            UpdatePlanRequest {
                status: Some(PlanStatus::Inactive),
                ..Default::default()
            },
        )
        .await?;

    let err = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(retired.id),
                personal_training_plan_id: None,
                start_date: Utc::now().date_naive(),
                amount_cents: retired.amount_cents,
                payment_method: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}
