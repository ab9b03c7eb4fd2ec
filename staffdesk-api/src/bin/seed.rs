//! # StaffDesk fixture loader
//!
//! Fills an empty database with generated demo data: employees, their
//! payroll history, vacation requests, and two accounts
//! (`admin@staffdesk.test` / `user@staffdesk.test`).
//!
//! ```bash
//! SEED_EMPLOYEES=50 SEED_RNG=7 cargo run -p staffdesk-api --bin staffdesk-seed
//! ```
//!
//! Refuses to run against a database that already has employees.

use anyhow::Context;
use staffdesk_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    fixtures::{generate, FixtureConfig, ADMIN_EMAIL, USER_EMAIL},
    models::{
        employee::{EmployeeFilter, EmployeeRecord},
        payroll::PayrollRecord,
        user::UserRecord,
        vacation::VacationRecord,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("{} has an invalid value", key)),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staffdesk_seed=info,staffdesk_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;
    let config = FixtureConfig {
        employees: env_or("SEED_EMPLOYEES", 25)?,
        seed: env_or("SEED_RNG", 42)?,
        ..FixtureConfig::default()
    };

    ensure_database_exists(&database_url).await?;
    let pool = create_pool(DatabaseConfig::new(database_url)).await?;
    run_migrations(&pool).await?;

    let existing = EmployeeRecord::count(&pool, &EmployeeFilter::default()).await?;
    if existing > 0 {
        anyhow::bail!("Database already contains {} employees; seed an empty database", existing);
    }

    tracing::info!(employees = config.employees, seed = config.seed, "Generating fixtures");
    let set = generate(&config)?;

    let mut rows = 0usize;
    for employee in &set.employees {
        EmployeeRecord::from_domain(employee).insert(&pool).await?;
        rows += 1;
    }
    for payroll in &set.payrolls {
        PayrollRecord::from_domain(payroll).insert(&pool).await?;
        rows += 1;
    }
    for vacation in &set.vacations {
        VacationRecord::from_domain(vacation).insert(&pool).await?;
        rows += 1;
    }
    for user in &set.users {
        if UserRecord::find_by_email(&pool, user.email().as_str()).await?.is_some() {
            tracing::info!(email = %user.email(), "User already exists, skipping");
            continue;
        }
        UserRecord::from_domain(user).insert(&pool).await?;
        rows += 1;
    }

    tracing::info!(
        rows,
        employees = set.employees.len(),
        payrolls = set.payrolls.len(),
        vacations = set.vacations.len(),
        "Fixtures loaded"
    );
    tracing::info!("Log in as {} or {}", ADMIN_EMAIL, USER_EMAIL);

    close_pool(pool).await;
    Ok(())
}
