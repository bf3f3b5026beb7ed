use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mimcal_core::{AppError, ErrorResponse};
use mimcal_models::{CreateReplyDto, LikeResponse, ReplyView, UpdateCommentDto};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::Caller;
use crate::modules::replies::service::ReplyService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Reply to a comment
#[utoipa::path(
    post,
    path = "/api/comment-replies",
    request_body = CreateReplyDto,
    responses(
        (status = 201, description = "Reply created", body = ReplyView),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Read and write access required", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_reply(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(dto): ValidatedJson<CreateReplyDto>,
) -> Result<(StatusCode, Json<ReplyView>), AppError> {
    let reply = ReplyService::create_reply(&state.db, caller, dto).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

/// Get a reply
#[utoipa::path(
    get,
    path = "/api/comment-replies/{id}",
    params(("id" = Uuid, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply details", body = ReplyView),
        (status = 404, description = "Reply not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_reply(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ReplyView>, AppError> {
    let reply = ReplyService::get_reply(&state.db, caller, id).await?;
    Ok(Json(reply))
}

/// Edit a reply (author only)
#[utoipa::path(
    patch,
    path = "/api/comment-replies/{id}",
    params(("id" = Uuid, Path, description = "Reply ID")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Reply updated", body = ReplyView),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Reply not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_reply(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCommentDto>,
) -> Result<Json<ReplyView>, AppError> {
    let reply = ReplyService::update_reply(&state.db, caller, id, dto).await?;
    Ok(Json(reply))
}

/// Delete a reply (author only)
#[utoipa::path(
    delete,
    path = "/api/comment-replies/{id}",
    params(("id" = Uuid, Path, description = "Reply ID")),
    responses(
        (status = 204, description = "Reply deleted"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Reply not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_reply(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ReplyService::delete_reply(&state.db, caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Like a reply
#[utoipa::path(
    post,
    path = "/api/comment-replies/{id}/like",
    params(("id" = Uuid, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply liked", body = LikeResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Reply not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn like_reply(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, AppError> {
    let response = ReplyService::like_reply(&state.db, caller, id).await?;
    Ok(Json(response))
}

/// Remove a like from a reply
#[utoipa::path(
    post,
    path = "/api/comment-replies/{id}/unlike",
    params(("id" = Uuid, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply unliked", body = LikeResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Reply not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn unlike_reply(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, AppError> {
    let response = ReplyService::unlike_reply(&state.db, caller, id).await?;
    Ok(Json(response))
}
