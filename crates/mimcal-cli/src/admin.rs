//! One-off account and access operations run by an operator.

use anyhow::{Context, bail};
use mimcal_auth::create_access_token;
use mimcal_config::JwtConfig;
use mimcal_core::{PermissionLevel, hash_password};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// One line of a schedule's access table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRow {
    pub username: String,
    pub override_level: Option<PermissionLevel>,
    pub effective_level: PermissionLevel,
}

#[derive(FromRow)]
struct RawAccessRow {
    username: String,
    override_level: Option<i32>,
}

/// Creates a user account and returns its id.
pub async fn create_user(db: &PgPool, username: &str, password: &str) -> anyhow::Result<Uuid> {
    if username.trim().is_empty() {
        bail!("username must not be empty");
    }
    if password.len() < 8 {
        bail!("password must be at least 8 characters");
    }

    let password_hash = hash_password(password).map_err(|e| e.error)?;

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(username)
    .bind(&password_hash)
    .fetch_one(db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            anyhow::anyhow!("user '{username}' already exists")
        }
        _ => anyhow::Error::from(e),
    })?;

    Ok(id)
}

/// Mints an access token for an existing user.
pub async fn issue_token(
    db: &PgPool,
    username: &str,
    jwt_config: &JwtConfig,
) -> anyhow::Result<String> {
    let user_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await?
        .with_context(|| format!("user '{username}' does not exist"))?;

    create_access_token(user_id, username, jwt_config).map_err(|e| e.error)
}

/// Every user together with the level they hold on `schedule_id`, highest
/// first. Users without an override hold the schedule default.
pub async fn schedule_access_table(
    db: &PgPool,
    schedule_id: Uuid,
) -> anyhow::Result<Vec<AccessRow>> {
    let default = sqlx::query_scalar::<_, i32>(
        "SELECT default_permission_level FROM schedules WHERE id = $1",
    )
    .bind(schedule_id)
    .fetch_optional(db)
    .await?
    .with_context(|| format!("schedule {schedule_id} does not exist"))?;
    let default = PermissionLevel::try_from(default)?;

    let raw = sqlx::query_as::<_, RawAccessRow>(
        r#"SELECT u.username, p.level AS override_level
           FROM users u
           LEFT JOIN schedule_permissions p ON p.user_id = u.id AND p.schedule_id = $1
           ORDER BY u.username"#,
    )
    .bind(schedule_id)
    .fetch_all(db)
    .await?;

    let mut rows = raw
        .into_iter()
        .map(|row| {
            let override_level = row.override_level.map(PermissionLevel::try_from).transpose()?;
            Ok(AccessRow {
                username: row.username,
                override_level,
                effective_level: PermissionLevel::resolve(default, override_level),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    rows.sort_by(|a, b| b.effective_level.cmp(&a.effective_level));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimcal_auth::verify_token;

    fn jwt_config() -> JwtConfig {
        JwtConfig::from_lookup(|key| (key == "JWT_SECRET").then(|| "cli-secret".to_string()))
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_user_rejects_duplicates(pool: PgPool) {
        create_user(&pool, "ada", "long-password").await.unwrap();
        let err = create_user(&pool, "ada", "long-password").await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_user_rejects_short_password(pool: PgPool) {
        assert!(create_user(&pool, "ada", "short").await.is_err());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_issue_token_for_existing_user(pool: PgPool) {
        let id = create_user(&pool, "ada", "long-password").await.unwrap();
        let config = jwt_config();

        let token = issue_token(&pool, "ada", &config).await.unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.user_id(), Some(id));

        assert!(issue_token(&pool, "nobody", &config).await.is_err());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_access_table_applies_default_floor(pool: PgPool) {
        let owner = create_user(&pool, "owner", "long-password").await.unwrap();
        let reader = create_user(&pool, "reader", "long-password").await.unwrap();
        create_user(&pool, "stranger", "long-password").await.unwrap();

        let schedule: Uuid = sqlx::query_scalar(
            "INSERT INTO schedules (name, owner_id, default_permission_level) VALUES ('s', $1, 1) RETURNING id",
        )
        .bind(owner)
        .fetch_one(&pool)
        .await
        .unwrap();
        for (user, level) in [(owner, 3), (reader, 0)] {
            sqlx::query(
                "INSERT INTO schedule_permissions (schedule_id, user_id, level) VALUES ($1, $2, $3)",
            )
            .bind(schedule)
            .bind(user)
            .bind(level)
            .execute(&pool)
            .await
            .unwrap();
        }

        let table = schedule_access_table(&pool, schedule).await.unwrap();
        assert_eq!(table[0].username, "owner");
        assert_eq!(table[0].effective_level, PermissionLevel::Manage);

        let reader_row = table.iter().find(|r| r.username == "reader").unwrap();
        assert_eq!(reader_row.override_level, Some(PermissionLevel::Restricted));
        assert_eq!(reader_row.effective_level, PermissionLevel::Read);

        let stranger = table.iter().find(|r| r.username == "stranger").unwrap();
        assert_eq!(stranger.override_level, None);
        assert_eq!(stranger.effective_level, PermissionLevel::Read);
    }
}
