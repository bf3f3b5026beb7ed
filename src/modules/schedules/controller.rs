use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mimcal_core::{AppError, ErrorResponse};
use mimcal_models::{
    CreateScheduleDto, EventListParams, EventView, ScheduleView, ScheduleWithEvents,
    UpdateScheduleDto,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::{AuthUser, Caller};
use crate::modules::events::service::EventService;
use crate::modules::schedules::service::ScheduleService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List the schedules visible to the caller
#[utoipa::path(
    get,
    path = "/api/schedules",
    responses(
        (status = 200, description = "Schedules the caller can read", body = Vec<ScheduleView>),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    ),
    tag = "Schedules",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_schedules(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<ScheduleView>>, AppError> {
    let schedules = ScheduleService::list_visible_schedules(&state.db, caller).await?;
    Ok(Json(schedules))
}

/// Create a schedule owned by the caller
#[utoipa::path(
    post,
    path = "/api/schedules",
    request_body = CreateScheduleDto,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleView),
        (status = 400, description = "Missing or invalid permission level", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_schedule(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateScheduleDto>,
) -> Result<(StatusCode, Json<ScheduleView>), AppError> {
    let owner_id = auth_user.user_id()?;
    let schedule = ScheduleService::create_schedule(&state.db, owner_id, dto).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// Get a schedule with its events
#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Schedule with events, newest first", body = ScheduleWithEvents),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    ),
    tag = "Schedules",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleWithEvents>, AppError> {
    let schedule = ScheduleService::get_schedule(&state.db, caller, id).await?;
    Ok(Json(schedule))
}

/// Rename a schedule or change its default permission level
#[utoipa::path(
    patch,
    path = "/api/schedules/{id}",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    request_body = UpdateScheduleDto,
    responses(
        (status = 200, description = "Schedule updated", body = ScheduleView),
        (status = 403, description = "Insufficient permission level", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Schedules",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_schedule(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateScheduleDto>,
) -> Result<Json<ScheduleView>, AppError> {
    let schedule = ScheduleService::update_schedule(&state.db, caller, id, dto).await?;
    Ok(Json(schedule))
}

/// Delete a schedule and everything in it
#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    responses(
        (status = 204, description = "Schedule deleted"),
        (status = 403, description = "Manage access required", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    ),
    tag = "Schedules",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ScheduleService::delete_schedule(&state.db, caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a schedule's events, newest first
#[utoipa::path(
    get,
    path = "/api/schedules/{id}/events",
    params(
        ("id" = Uuid, Path, description = "Schedule ID"),
        EventListParams
    ),
    responses(
        (status = 200, description = "Events, newest first", body = Vec<EventView>),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    ),
    tag = "Schedules",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_schedule_events(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Query(params): Query<EventListParams>,
) -> Result<Json<Vec<EventView>>, AppError> {
    let events =
        EventService::list_schedule_events(&state.db, caller, id, params.limit()).await?;
    Ok(Json(events))
}
