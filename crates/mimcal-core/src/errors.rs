//! Application error type with HTTP response conversion.
//!
//! Every fallible handler and service in Mimcal returns [`AppError`]. The
//! status code decides how the request-handling layer reports the failure:
//!
//! | Constructor | Status | Meaning |
//! |-------------|--------|---------|
//! | [`AppError::not_found`] | 404 | Resource absent, or hidden from the caller |
//! | [`AppError::access_denied`] | 403 | Resource visible, action not permitted |
//! | [`AppError::bad_request`] | 400 | Business-rule validation failure |
//! | [`AppError::unprocessable`] | 422 | Malformed request body |
//! | [`AppError::unauthorized`] | 401 | Identity required or token rejected |
//! | [`AppError::internal`] | 500 | Anything else |
//!
//! Any error convertible into [`anyhow::Error`] (including `sqlx::Error`)
//! converts into a 500 through `?`.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    /// Identifier of the object the caller was refused access to.
    pub object_id: Option<Uuid>,
}

/// JSON body written for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Uuid>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            object_id: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    /// Refusal that names the object but never the reason.
    pub fn access_denied(object_id: Uuid) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            error: anyhow::anyhow!("You don't have permission to access"),
            object_id: Some(object_id),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = ?self.error, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.error.to_string(),
            object_id: self.object_id,
        });

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
