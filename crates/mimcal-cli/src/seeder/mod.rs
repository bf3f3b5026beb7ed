//! Development data seeding.
//!
//! Seeded users share one bcrypt hash of [`DEFAULT_SEED_PASSWORD`], so the
//! expensive hashing runs once per seeding run.

pub mod models;
pub mod schedules;
pub mod users;

pub use models::{SEED_USERNAME_PREFIX, SeedConfig};

use mimcal_core::hash_password;
use sqlx::PgPool;
use std::time::Instant;

pub const DEFAULT_SEED_PASSWORD: &str = "password123";

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!(
        "🌱 Seeding {} users, {} schedules and {} events",
        config.num_users,
        config.total_schedules(),
        config.total_events()
    );

    let password_hash = hash_password(DEFAULT_SEED_PASSWORD).map_err(|e| e.error)?;
    let user_ids = users::seed_users(db, config.num_users, &password_hash).await?;

    schedules::seed_schedules(
        db,
        &user_ids,
        &user_ids,
        config.schedules_per_user,
        config.overrides_per_schedule,
        config.events_per_schedule,
    )
    .await?;

    println!("✅ Seeding finished in {:?}", start_time.elapsed());
    println!("   Seeded accounts use the password '{DEFAULT_SEED_PASSWORD}'");
    Ok(())
}

/// Removes everything created by [`seed_all`]. Accounts created any other
/// way are kept.
pub async fn clear_seed(db: &PgPool) -> anyhow::Result<u64> {
    users::clear_users(db).await
}
