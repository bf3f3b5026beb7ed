use axum::{
    Json,
    extract::{Path, State},
};
use mimcal_core::{AppError, ErrorResponse};
use mimcal_models::{GrantPermissionDto, PermissionChangeResponse, SchedulePermission};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::Caller;
use crate::modules::permissions::service::PermissionService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List a schedule's permission overrides
#[utoipa::path(
    get,
    path = "/api/schedules/{id}/permissions",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Overrides sorted by username", body = Vec<SchedulePermission>),
        (status = 403, description = "Manage access required", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    ),
    tag = "Permissions",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_permissions(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SchedulePermission>>, AppError> {
    let permissions = PermissionService::list_permissions(&state.db, caller, id).await?;
    Ok(Json(permissions))
}

/// Grant or change a user's permission level on a schedule
#[utoipa::path(
    put,
    path = "/api/schedules/{id}/permissions",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    request_body = GrantPermissionDto,
    responses(
        (status = 200, description = "Permission level changed", body = PermissionChangeResponse),
        (status = 400, description = "Unknown user, invalid level, or owner downgrade", body = ErrorResponse),
        (status = 403, description = "Manage access required", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    ),
    tag = "Permissions",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn grant_permission(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<GrantPermissionDto>,
) -> Result<Json<PermissionChangeResponse>, AppError> {
    let response = PermissionService::grant(&state.db, caller, id, dto).await?;
    Ok(Json(response))
}

/// Remove a user's permission override
#[utoipa::path(
    delete,
    path = "/api/schedules/{id}/permissions/{username}",
    params(
        ("id" = Uuid, Path, description = "Schedule ID"),
        ("username" = String, Path, description = "User whose override is removed")
    ),
    responses(
        (status = 200, description = "Override removed", body = PermissionChangeResponse),
        (status = 400, description = "Unknown user, no override, or schedule owner", body = ErrorResponse),
        (status = 403, description = "Manage access required", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    ),
    tag = "Permissions",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn revoke_permission(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, username)): Path<(Uuid, String)>,
) -> Result<Json<PermissionChangeResponse>, AppError> {
    let response = PermissionService::revoke(&state.db, caller, id, &username).await?;
    Ok(Json(response))
}
