use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;

use liftdesk::{
    domain::{
        CreateMemberRequest, CreatePlanRequest, CreateTaskRequest, PaymentMethod, PlanType,
        RecordPaymentRequest,
    },
    repository::TaskRepository,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🌱 Starting database seeding...");

    // Initialize database connection
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:liftdesk.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    // Run migrations first
    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let ctx = ServiceContext::new(db_pool);

    // Seed the plan catalog
    println!("📦 Creating plans...");

    let monthly = ctx
        .plan_service
        .create(CreatePlanRequest {
            name: "Monthly Membership".to_string(),
            duration_days: 30,
            amount_cents: 4_900,
            plan_type: PlanType::MembershipPlan,
        })
        .await?;

    let annual = ctx
        .plan_service
        .create(CreatePlanRequest {
            name: "Annual Membership".to_string(),
            duration_days: 365,
            amount_cents: 49_900,
            plan_type: PlanType::MembershipPlan,
        })
        .await?;

    let training = ctx
        .plan_service
        .create(CreatePlanRequest {
            name: "Personal Training (1 month)".to_string(),
            duration_days: 30,
            amount_cents: 19_900,
            plan_type: PlanType::PersonalTraining,
        })
        .await?;

    println!("  ✅ Created 3 plans");

    // Seed members
    println!("👥 Creating members...");

    let alice = ctx
        .member_service
        .register_member(CreateMemberRequest {
            full_name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
            phone: Some("555-0101".to_string()),
        })
        .await?;

    let bob = ctx
        .member_service
        .register_member(CreateMemberRequest {
            full_name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
            phone: Some("555-0102".to_string()),
        })
        .await?;

    // Charlie signs up but never buys a plan
    ctx.member_service
        .register_member(CreateMemberRequest {
            full_name: "Charlie Brown".to_string(),
            email: "charlie@example.com".to_string(),
            phone: None,
        })
        .await?;

    println!("  ✅ Created 3 members");

    // Open paid periods through the payment processor
    println!("💳 Recording payments...");

    let today = Utc::now().date_naive();

    ctx.payment_service
        .record_payment(
            alice.id,
            RecordPaymentRequest {
                membership_plan_id: Some(annual.id),
                personal_training_plan_id: Some(training.id),
                start_date: today,
                amount_cents: annual.amount_cents + training.amount_cents,
                payment_method: Some(PaymentMethod::Bank),
            },
        )
        .await?;

    ctx.payment_service
        .record_payment(
            bob.id,
            RecordPaymentRequest {
                membership_plan_id: Some(monthly.id),
                personal_training_plan_id: None,
                start_date: today,
                amount_cents: monthly.amount_cents,
                payment_method: Some(PaymentMethod::Cash),
            },
        )
        .await?;

    println!("  ✅ Recorded 2 payments");

    // A couple of front-desk tasks
    println!("📝 Creating tasks...");

    ctx.task_repo
        .create(CreateTaskRequest {
            title: "Order replacement barbell clips".to_string(),
        })
        .await?;

    ctx.task_repo
        .create(CreateTaskRequest {
            title: "Call Charlie about a trial session".to_string(),
        })
        .await?;

    println!("  ✅ Created 2 tasks");

    println!("🎉 Seeding complete!");

    Ok(())
}
