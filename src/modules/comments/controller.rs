use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mimcal_core::{AppError, ErrorResponse};
use mimcal_models::{CommentView, CreateCommentDto, LikeResponse, UpdateCommentDto};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::Caller;
use crate::modules::comments::service::CommentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Comment on an event
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentView),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Read and write access required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_comment(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(dto): ValidatedJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<CommentView>), AppError> {
    let comment = CommentService::create_comment(&state.db, caller, dto).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Get a comment with its replies
#[utoipa::path(
    get,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment details", body = CommentView),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CommentView>, AppError> {
    let comment = CommentService::get_comment(&state.db, caller, id).await?;
    Ok(Json(comment))
}

/// Edit a comment (author only)
#[utoipa::path(
    patch,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentView),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCommentDto>,
) -> Result<Json<CommentView>, AppError> {
    let comment = CommentService::update_comment(&state.db, caller, id, dto).await?;
    Ok(Json(comment))
}

/// Delete a comment (author only)
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CommentService::delete_comment(&state.db, caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Like a comment
#[utoipa::path(
    post,
    path = "/api/comments/{id}/like",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment liked", body = LikeResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn like_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, AppError> {
    let response = CommentService::like_comment(&state.db, caller, id).await?;
    Ok(Json(response))
}

/// Remove a like from a comment
#[utoipa::path(
    post,
    path = "/api/comments/{id}/unlike",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment unliked", body = LikeResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn unlike_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, AppError> {
    let response = CommentService::unlike_comment(&state.db, caller, id).await?;
    Ok(Json(response))
}
