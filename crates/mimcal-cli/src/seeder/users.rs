//! Fake user accounts.

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;
use uuid::Uuid;

use super::models::{SEED_USERNAME_PREFIX, UserSeed};

const BATCH_SIZE: usize = 500;

fn slug(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Usernames embed the index, so a run never collides with itself.
pub fn generate_users(count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            UserSeed {
                username: format!(
                    "{SEED_USERNAME_PREFIX}{}.{}{idx}",
                    slug(&first_name),
                    slug(&last_name)
                ),
                password_hash: password_hash.to_string(),
            }
        })
        .collect()
}

pub async fn seed_users(
    db: &PgPool,
    count: usize,
    password_hash: &str,
) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    println!("👤 Seeding {count} users...");

    let users = generate_users(count, password_hash);
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let mut query =
            QueryBuilder::<Postgres>::new("INSERT INTO users (username, password_hash) ");
        query.push_values(chunk, |mut row, user| {
            row.push_bind(&user.username).push_bind(&user.password_hash);
        });
        query.push(" ON CONFLICT (username) DO NOTHING RETURNING id");

        let chunk_ids: Vec<Uuid> = query.build_query_scalar().fetch_all(&mut *tx).await?;
        ids.extend(chunk_ids);
    }

    tx.commit().await?;
    println!("   ✓ Inserted {} users in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

/// Deletes seeded users. Their schedules, overrides, marks, comments and
/// likes cascade.
pub async fn clear_users(db: &PgPool) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded users...");

    let deleted = sqlx::query("DELETE FROM users WHERE starts_with(username, $1)")
        .bind(SEED_USERNAME_PREFIX)
        .execute(db)
        .await?
        .rows_affected();

    println!("   ✓ Deleted {deleted} users in {:?}", start_time.elapsed());
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_usernames_are_unique_and_prefixed() {
        let users = generate_users(200, "hash");
        let names: HashSet<_> = users.iter().map(|u| u.username.as_str()).collect();

        assert_eq!(names.len(), 200);
        assert!(users.iter().all(|u| u.username.starts_with(SEED_USERNAME_PREFIX)));
        assert!(users.iter().all(|u| u.password_hash == "hash"));
    }

    #[test]
    fn test_slug_strips_punctuation() {
        assert_eq!(slug("O'Connor"), "oconnor");
        assert_eq!(slug("Mary Ann"), "maryann");
    }
}
