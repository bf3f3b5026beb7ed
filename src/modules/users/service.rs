use mimcal_core::AppError;
use mimcal_models::{ProfileResponse, User};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, user_id: Uuid) -> Result<ProfileResponse, AppError> {
        sqlx::query_as::<_, ProfileResponse>(
            r#"SELECT u.id, u.username, u.created_at,
                      (SELECT COUNT(*) FROM schedules s WHERE s.owner_id = u.id) AS owned_schedules
               FROM users u
               WHERE u.id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(db))]
    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Looks a user up by username; an unknown name is a validation error.
    #[instrument(skip(db))]
    pub async fn require_by_username(db: &PgPool, username: &str) -> Result<User, AppError> {
        Self::find_by_username(db, username).await?.ok_or_else(|| {
            AppError::bad_request(anyhow::anyhow!("User '{username}' does not exist"))
        })
    }
}
