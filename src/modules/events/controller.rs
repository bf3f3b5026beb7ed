use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mimcal_core::{AppError, ErrorResponse};
use mimcal_models::{
    CommentView, CreateEventDto, EventType, EventView, StatusResponse, UpdateEventDto,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::Caller;
use crate::modules::comments::service::CommentService;
use crate::modules::events::service::EventService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List event types
#[utoipa::path(
    get,
    path = "/api/event-types",
    responses(
        (status = 200, description = "All event types", body = Vec<EventType>)
    ),
    tag = "Events"
)]
#[instrument(skip(state))]
pub async fn list_event_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventType>>, AppError> {
    let types = EventService::list_event_types(&state.db).await?;
    Ok(Json(types))
}

/// Create an event in a schedule
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created", body = EventView),
        (status = 400, description = "Unknown event type or malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 403, description = "Read and write access required", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Events",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(dto): ValidatedJson<CreateEventDto>,
) -> Result<(StatusCode, Json<EventView>), AppError> {
    let event = EventService::create_event(&state.db, caller, dto).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Get an event
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = EventView),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<EventView>, AppError> {
    let event = EventService::get_event(&state.db, caller, id).await?;
    Ok(Json(event))
}

/// Update an event
#[utoipa::path(
    patch,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = EventView),
        (status = 400, description = "Invalid date range or event type", body = ErrorResponse),
        (status = 403, description = "Read and write access required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Events",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateEventDto>,
) -> Result<Json<EventView>, AppError> {
    let event = EventService::update_event(&state.db, caller, id, dto).await?;
    Ok(Json(event))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Read and write access required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    EventService::delete_event(&state.db, caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark an event as attended
#[utoipa::path(
    post,
    path = "/api/events/{id}/check",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event checked", body = StatusResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn check_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = EventService::check_event(&state.db, caller, id).await?;
    Ok(Json(status))
}

/// Remove the caller's attendance mark
#[utoipa::path(
    post,
    path = "/api/events/{id}/uncheck",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event unchecked", body = StatusResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn uncheck_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = EventService::uncheck_event(&state.db, caller, id).await?;
    Ok(Json(status))
}

/// List an event's comments with their replies
#[utoipa::path(
    get,
    path = "/api/events/{id}/comments",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentView>),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_event_comments(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommentView>>, AppError> {
    let comments = CommentService::list_for_event(&state.db, caller, id).await?;
    Ok(Json(comments))
}
