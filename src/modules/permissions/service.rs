use mimcal_core::{AppError, PermissionLevel};
use mimcal_models::{GrantPermissionDto, PermissionChangeResponse, SchedulePermission};
use mimcal_observability::track_permission_changed;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{AccessTarget, PermissionStore, ScheduleAction, ScheduleGuard, ScheduleAccess};
use crate::middleware::auth::Caller;
use crate::modules::users::service::UserService;

/// Grant and revoke per-user overrides. Every operation requires MANAGE.
pub struct PermissionService;

impl PermissionService {
    async fn authorize_manage(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
    ) -> Result<ScheduleAccess, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::ManagePermissions,
            AccessTarget::Schedule(schedule_id),
        )
        .await
    }

    #[instrument(skip(db))]
    pub async fn list_permissions(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
    ) -> Result<Vec<SchedulePermission>, AppError> {
        Self::authorize_manage(db, caller, schedule_id).await?;
        PermissionStore::list_overrides(db, schedule_id).await
    }

    /// Sets `dto.username`'s override to `dto.level`, replacing any existing
    /// one. The owner always keeps MANAGE.
    #[instrument(skip(db))]
    pub async fn grant(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
        dto: GrantPermissionDto,
    ) -> Result<PermissionChangeResponse, AppError> {
        let access = Self::authorize_manage(db, caller, schedule_id).await?;
        let user = UserService::require_by_username(db, &dto.username).await?;

        if access.is_owner(user.id) && dto.level < PermissionLevel::Manage {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "The schedule owner's permission level cannot be lowered"
            )));
        }

        PermissionStore::set_override(db, schedule_id, user.id, dto.level).await?;

        info!(
            schedule_id = %schedule_id,
            user_id = %user.id,
            level = dto.level.value(),
            granted_by = ?caller.user_id(),
            "Permission override set"
        );
        track_permission_changed("granted");

        Ok(PermissionChangeResponse {
            status: "changed permission level".to_string(),
            schedule_id,
            username: user.username,
            level: Some(dto.level),
        })
    }

    /// Removes `username`'s override; the schedule default applies again.
    #[instrument(skip(db))]
    pub async fn revoke(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
        username: &str,
    ) -> Result<PermissionChangeResponse, AppError> {
        let access = Self::authorize_manage(db, caller, schedule_id).await?;
        let user = UserService::require_by_username(db, username).await?;

        if access.is_owner(user.id) {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "The schedule owner's permission cannot be removed"
            )));
        }

        PermissionStore::remove_override(db, schedule_id, user.id).await?;

        info!(
            schedule_id = %schedule_id,
            user_id = %user.id,
            revoked_by = ?caller.user_id(),
            "Permission override removed"
        );
        track_permission_changed("revoked");

        Ok(PermissionChangeResponse {
            status: "removed permission override".to_string(),
            schedule_id,
            username: user.username,
            level: None,
        })
    }
}
