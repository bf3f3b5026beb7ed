use axum::{Json, extract::State};
use mimcal_core::{AppError, ErrorResponse};
use mimcal_models::ProfileResponse;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::users::service::UserService;
use crate::state::AppState;

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token, or unregistered user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let profile = UserService::get_profile(&state.db, user_id).await?;
    Ok(Json(profile))
}
