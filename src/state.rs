use mimcal_config::{CorsConfig, DatabaseConfig, JwtConfig};
use mimcal_db::init_db_pool;
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

pub async fn init_app_state() -> Result<AppState, sqlx::Error> {
    Ok(AppState {
        db: init_db_pool(&DatabaseConfig::from_env()).await?,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    })
}
