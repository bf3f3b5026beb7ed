//! Per-user permission overrides on a schedule.

use chrono::{DateTime, Utc};
use mimcal_core::PermissionLevel;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// One override row, joined with the user it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SchedulePermission {
    pub schedule_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    #[sqlx(try_from = "i32")]
    #[schema(value_type = i32, minimum = 0, maximum = 3)]
    pub level: PermissionLevel,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GrantPermissionDto {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[schema(value_type = i32, minimum = 0, maximum = 3)]
    pub level: PermissionLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionChangeResponse {
    pub status: String,
    pub schedule_id: Uuid,
    pub username: String,
    #[schema(value_type = Option<i32>, minimum = 0, maximum = 3)]
    pub level: Option<PermissionLevel>,
}
