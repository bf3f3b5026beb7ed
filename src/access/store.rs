use mimcal_core::{AppError, PermissionLevel};
use mimcal_models::SchedulePermission;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;
use uuid::Uuid;

/// Per-(schedule, user) permission overrides.
///
/// At most one row exists per pair; writes are single statements so that
/// concurrent grants on the same pair cannot produce duplicates.
pub struct PermissionStore;

impl PermissionStore {
    #[instrument(skip(db))]
    pub async fn get_override(
        db: &PgPool,
        schedule_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PermissionLevel>, AppError> {
        let level = sqlx::query_scalar::<_, i32>(
            "SELECT level FROM schedule_permissions WHERE schedule_id = $1 AND user_id = $2",
        )
        .bind(schedule_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        level
            .map(PermissionLevel::try_from)
            .transpose()
            .map_err(AppError::internal)
    }

    /// Creates the override or updates the existing one in place.
    #[instrument(skip(executor))]
    pub async fn set_override<'e, E>(
        executor: E,
        schedule_id: Uuid,
        user_id: Uuid,
        level: PermissionLevel,
    ) -> Result<(), AppError>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"INSERT INTO schedule_permissions (schedule_id, user_id, level)
               VALUES ($1, $2, $3)
               ON CONFLICT (schedule_id, user_id)
               DO UPDATE SET level = EXCLUDED.level, updated_at = NOW()"#,
        )
        .bind(schedule_id)
        .bind(user_id)
        .bind(i32::from(level))
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Deletes the override. Removing one that does not exist is a
    /// validation error rather than a silent no-op.
    #[instrument(skip(db))]
    pub async fn remove_override(
        db: &PgPool,
        schedule_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM schedule_permissions WHERE schedule_id = $1 AND user_id = $2",
        )
        .bind(schedule_id)
        .bind(user_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "User has no permission override on this schedule"
            )));
        }

        Ok(())
    }

    /// All overrides on a schedule, sorted by username.
    #[instrument(skip(db))]
    pub async fn list_overrides(
        db: &PgPool,
        schedule_id: Uuid,
    ) -> Result<Vec<SchedulePermission>, AppError> {
        let overrides = sqlx::query_as::<_, SchedulePermission>(
            r#"SELECT p.schedule_id, p.user_id, u.username, p.level, p.updated_at
               FROM schedule_permissions p
               JOIN users u ON u.id = p.user_id
               WHERE p.schedule_id = $1
               ORDER BY u.username"#,
        )
        .bind(schedule_id)
        .fetch_all(db)
        .await?;

        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn insert_user(pool: &PgPool, username: &str) -> Uuid {
        sqlx::query_scalar("INSERT INTO users (username, password_hash) VALUES ($1, 'x') RETURNING id")
            .bind(username)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn insert_schedule(pool: &PgPool, owner_id: Uuid) -> Uuid {
        sqlx::query_scalar(
            "INSERT INTO schedules (name, owner_id, default_permission_level) VALUES ('test_schedule', $1, 0) RETURNING id",
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn count_rows(pool: &PgPool, schedule_id: Uuid, user_id: Uuid) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM schedule_permissions WHERE schedule_id = $1 AND user_id = $2",
        )
        .bind(schedule_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_set_override_twice_keeps_one_row(pool: PgPool) {
        let owner = insert_user(&pool, "owner").await;
        let user = insert_user(&pool, "guest").await;
        let schedule = insert_schedule(&pool, owner).await;

        PermissionStore::set_override(&pool, schedule, user, PermissionLevel::Read)
            .await
            .unwrap();
        PermissionStore::set_override(&pool, schedule, user, PermissionLevel::Read)
            .await
            .unwrap();

        assert_eq!(count_rows(&pool, schedule, user).await, 1);
        assert_eq!(
            PermissionStore::get_override(&pool, schedule, user).await.unwrap(),
            Some(PermissionLevel::Read)
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_set_override_updates_in_place(pool: PgPool) {
        let owner = insert_user(&pool, "owner").await;
        let user = insert_user(&pool, "guest").await;
        let schedule = insert_schedule(&pool, owner).await;

        PermissionStore::set_override(&pool, schedule, user, PermissionLevel::Read)
            .await
            .unwrap();
        PermissionStore::set_override(&pool, schedule, user, PermissionLevel::Manage)
            .await
            .unwrap();

        assert_eq!(count_rows(&pool, schedule, user).await, 1);
        assert_eq!(
            PermissionStore::get_override(&pool, schedule, user).await.unwrap(),
            Some(PermissionLevel::Manage)
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_remove_missing_override_is_rejected(pool: PgPool) {
        let owner = insert_user(&pool, "owner").await;
        let user = insert_user(&pool, "guest").await;
        let schedule = insert_schedule(&pool, owner).await;

        let err = PermissionStore::remove_override(&pool, schedule, user)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        PermissionStore::set_override(&pool, schedule, user, PermissionLevel::ReadWrite)
            .await
            .unwrap();
        PermissionStore::remove_override(&pool, schedule, user)
            .await
            .unwrap();
        assert_eq!(
            PermissionStore::get_override(&pool, schedule, user).await.unwrap(),
            None
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_overrides_sorted_by_username(pool: PgPool) {
        let owner = insert_user(&pool, "owner").await;
        let zed = insert_user(&pool, "zed").await;
        let amy = insert_user(&pool, "amy").await;
        let schedule = insert_schedule(&pool, owner).await;

        PermissionStore::set_override(&pool, schedule, zed, PermissionLevel::Read)
            .await
            .unwrap();
        PermissionStore::set_override(&pool, schedule, amy, PermissionLevel::Manage)
            .await
            .unwrap();

        let overrides = PermissionStore::list_overrides(&pool, schedule).await.unwrap();
        let names: Vec<_> = overrides.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, ["amy", "zed"]);
        assert_eq!(overrides[0].level, PermissionLevel::Manage);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_set_override_keeps_one_row(pool: PgPool) {
        let owner = insert_user(&pool, "owner").await;
        let user = insert_user(&pool, "guest").await;
        let schedule = insert_schedule(&pool, owner).await;

        let handles: Vec<_> = (0..24)
            .map(|i| {
                let pool = pool.clone();
                let level = PermissionLevel::ALL[i % PermissionLevel::ALL.len()];
                tokio::spawn(async move {
                    PermissionStore::set_override(&pool, schedule, user, level).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(count_rows(&pool, schedule, user).await, 1);
        assert!(
            PermissionStore::get_override(&pool, schedule, user)
                .await
                .unwrap()
                .is_some()
        );
    }
}
