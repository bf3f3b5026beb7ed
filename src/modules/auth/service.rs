use mimcal_core::{AppError, hash_password};
use mimcal_models::{RegisterUserDto, User};
use mimcal_observability::track_user_registered;
use sqlx::PgPool;
use tracing::{info, instrument};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto), fields(username = %dto.username))]
    pub async fn register_user(db: &PgPool, dto: RegisterUserDto) -> Result<User, AppError> {
        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (username, password_hash)
               VALUES ($1, $2)
               RETURNING id, username, created_at"#,
        )
        .bind(&dto.username)
        .bind(&password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::bad_request(anyhow::anyhow!(
                    "A user with this username already exists"
                ));
            }
            AppError::from(e)
        })?;

        info!(user_id = %user.id, "User registered");
        track_user_registered();

        Ok(user)
    }
}
