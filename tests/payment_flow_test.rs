use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use liftdesk::{
    domain::{
        CreateMemberRequest, CreatePlanRequest, Member, PaymentMethod, Plan, PlanAttribution,
        PlanType, RecordPaymentRequest,
    },
    error::AppError,
    repository::{MemberRepository, PaymentRepository, PlanHistoryRepository},
    service::ServiceContext,
};

async fn setup() -> anyhow::Result<ServiceContext> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(ServiceContext::new(pool))
}

async fn register_member(ctx: &ServiceContext, email: &str) -> anyhow::Result<Member> {
    Ok(ctx
        .member_service
        .register_member(CreateMemberRequest {
            full_name: "Test Member".to_string(),
            email: email.to_string(),
            phone: None,
        })
        .await?)
}

async fn create_plan(
    ctx: &ServiceContext,
    name: &str,
    plan_type: PlanType,
    duration_days: i64,
    amount_cents: i64,
) -> anyhow::Result<Plan> {
    Ok(ctx
        .plan_service
        .create(CreatePlanRequest {
            name: name.to_string(),
            duration_days,
            amount_cents,
            plan_type,
        })
        .await?)
}

#[tokio::test]
async fn rejects_payment_with_no_plan_selected() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let member = register_member(&ctx, "noplan@example.com").await?;

    let err = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: None,
                personal_training_plan_id: None,
                start_date: Utc::now().date_naive(),
                amount_cents: 4_900,
                payment_method: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn membership_purchase_opens_period_and_sets_pointer() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let member = register_member(&ctx, "alice@example.com").await?;
    let plan = create_plan(&ctx, "Monthly", PlanType::MembershipPlan, 30, 4_900).await?;

    let result = ctx
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
        .await?;

    assert_eq!(result.plan_histories.len(), 1);
    let period = &result.plan_histories[0];
    assert_eq!(period.due_date - period.start_date, Duration::days(30));
    assert_eq!(result.due_date, Some(period.due_date));

    // Payment method defaults to cash, dated now rather than the start date
    assert_eq!(result.payment.payment_method, PaymentMethod::Cash);
    assert_eq!(result.payment.amount_cents, plan.amount_cents);

    // The active-plan pointer now references the new period
    let reloaded = ctx.member_repo.find_by_id(member.id).await?.unwrap();
    assert_eq!(reloaded.active_plan_id, Some(period.id));

    Ok(())
}

#[tokio::test]
async fn overlapping_period_of_same_type_is_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let member = register_member(&ctx, "bob@example.com").await?;
    let plan = create_plan(&ctx, "Monthly", PlanType::MembershipPlan, 30, 4_900).await?;

    let today = Utc::now().date_naive();
    let first = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(plan.id),
                personal_training_plan_id: None,
                start_date: today,
                amount_cents: plan.amount_cents,
                payment_method: None,
            },
        )
        .await?;
    let current_due = first.plan_histories[0].due_date;

    // A start date inside the running period must fail, carrying the
    // conflicting due date
    let err = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(plan.id),
                personal_training_plan_id: None,
                start_date: today + Duration::days(10),
                amount_cents: plan.amount_cents,
                payment_method: None,
            },
        )
        .await
        .unwrap_err();
    match err {
        AppError::Overlap { due_date, .. } => assert_eq!(due_date, current_due),
        other => panic!("expected Overlap, got {:?}", other),
    }

    // Starting exactly on the due date still overlaps
    let err = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(plan.id),
                personal_training_plan_id: None,
                start_date: today + Duration::days(30),
                amount_cents: plan.amount_cents,
                payment_method: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Overlap { .. }));

    // Strictly after the current period's expiry succeeds
    let renewal = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(plan.id),
                personal_training_plan_id: None,
                start_date: today + Duration::days(31),
                amount_cents: plan.amount_cents,
                payment_method: None,
            },
        )
        .await?;
    assert_eq!(renewal.plan_histories.len(), 1);

    // The pointer still references the running period, not the future one
    let reloaded = ctx.member_repo.find_by_id(member.id).await?.unwrap();
    assert_eq!(reloaded.active_plan_id, Some(first.plan_histories[0].id));

    Ok(())
}

#[tokio::test]
async fn dual_purchase_creates_two_periods_and_one_payment() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let member = register_member(&ctx, "carol@example.com").await?;
    let membership = create_plan(&ctx, "Monthly", PlanType::MembershipPlan, 30, 4_900).await?;
    let training =
        create_plan(&ctx, "PT Month", PlanType::PersonalTraining, 30, 19_900).await?;

    let result = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(membership.id),
                personal_training_plan_id: Some(training.id),
                start_date: Utc::now().date_naive(),
                amount_cents: membership.amount_cents + training.amount_cents,
                payment_method: Some(PaymentMethod::Both),
            },
        )
        .await?;

    assert_eq!(result.plan_histories.len(), 2);

    // Exactly one ledger entry covers the whole purchase
    let payments = ctx.payment_repo.find_by_member(member.id).await?;
    assert_eq!(payments.len(), 1);
    assert_eq!(
        payments[0].amount_cents,
        membership.amount_cents + training.amount_cents
    );

    // The effective due date is the membership period's
    let membership_row = result
        .plan_histories
        .iter()
        .find(|h| h.plan_type == PlanType::MembershipPlan)
        .unwrap();
    assert_eq!(result.due_date, Some(membership_row.due_date));

    // Both periods coexist because they are of different types
    let history = ctx.plan_history_repo.find_by_member(member.id).await?;
    assert_eq!(history.len(), 2);

    Ok(())
}

#[tokio::test]
async fn payments_are_attributed_to_the_periods_they_funded() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let member = register_member(&ctx, "dave@example.com").await?;
    let membership = create_plan(&ctx, "Monthly", PlanType::MembershipPlan, 30, 4_900).await?;
    let training =
        create_plan(&ctx, "PT Month", PlanType::PersonalTraining, 30, 19_900).await?;

    let result = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(membership.id),
                personal_training_plan_id: Some(training.id),
                start_date: Utc::now().date_naive(),
                amount_cents: membership.amount_cents + training.amount_cents,
                payment_method: None,
            },
        )
        .await?;

    let attribution = ctx
        .payment_service
        .classify_payment(result.payment.id)
        .await?;
    assert_eq!(attribution, PlanAttribution::Both);

    Ok(())
}

#[tokio::test]
async fn unknown_plan_or_member_is_not_found() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let member = register_member(&ctx, "erin@example.com").await?;

    let err = ctx
        .payment_service
        .record_payment(
            member.id,
            RecordPaymentRequest {
                membership_plan_id: Some(uuid::Uuid::new_v4()),
                personal_training_plan_id: None,
                start_date: Utc::now().date_naive(),
                amount_cents: 4_900,
                payment_method: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let plan = create_plan(&ctx, "Monthly", PlanType::MembershipPlan, 30, 4_900).await?;
    let err = ctx
        .payment_service
        .record_payment(
            uuid::Uuid::new_v4(),
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

    Ok(())
}
