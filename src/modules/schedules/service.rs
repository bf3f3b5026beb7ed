use mimcal_core::{AppError, PermissionLevel};
use mimcal_models::{
    CreateScheduleDto, Schedule, ScheduleView, ScheduleWithEvents, UpdateScheduleDto,
};
use mimcal_observability::{track_schedule_created, track_schedule_deleted};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{AccessResolver, AccessTarget, PermissionStore, ScheduleAction, ScheduleGuard};
use crate::middleware::auth::{Caller, map_unregistered_user};
use crate::modules::events::service::EventService;

pub struct ScheduleService;

impl ScheduleService {
    /// Schedules the caller can at least read. Others are silently left out.
    #[instrument(skip(db))]
    pub async fn list_visible_schedules(
        db: &PgPool,
        caller: Caller,
    ) -> Result<Vec<ScheduleView>, AppError> {
        let schedules = AccessResolver::list_visible(db, caller, PermissionLevel::Read).await?;
        Ok(schedules.into_iter().map(|access| access.into_view()).collect())
    }

    /// Creates the schedule and grants its owner MANAGE in one transaction.
    #[instrument(skip(db))]
    pub async fn create_schedule(
        db: &PgPool,
        owner_id: Uuid,
        dto: CreateScheduleDto,
    ) -> Result<ScheduleView, AppError> {
        let mut tx = db.begin().await?;

        let schedule = sqlx::query_as::<_, Schedule>(
            r#"INSERT INTO schedules (name, owner_id, default_permission_level)
               VALUES ($1, $2, $3)
               RETURNING id, name, owner_id, default_permission_level, created_at, updated_at"#,
        )
        .bind(&dto.name)
        .bind(owner_id)
        .bind(i32::from(dto.default_permission_level))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unregistered_user)?;

        PermissionStore::set_override(&mut *tx, schedule.id, owner_id, PermissionLevel::Manage)
            .await?;

        tx.commit().await?;

        info!(
            schedule_id = %schedule.id,
            owner_id = %owner_id,
            default_level = schedule.default_permission_level.value(),
            "Schedule created"
        );
        track_schedule_created(schedule.default_permission_level.value());

        Ok(ScheduleView::new(schedule, PermissionLevel::Manage))
    }

    #[instrument(skip(db))]
    pub async fn get_schedule(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
    ) -> Result<ScheduleWithEvents, AppError> {
        let access = ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::ReadSchedule,
            AccessTarget::Schedule(schedule_id),
        )
        .await?;

        let events = EventService::fetch_for_schedule(db, caller, schedule_id, None).await?;

        Ok(ScheduleWithEvents {
            schedule: access.into_view(),
            events,
        })
    }

    /// Renaming needs READ_WRITE; changing the default level needs MANAGE.
    #[instrument(skip(db))]
    pub async fn update_schedule(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
        dto: UpdateScheduleDto,
    ) -> Result<ScheduleView, AppError> {
        let action = if dto.default_permission_level.is_some() {
            ScheduleAction::ChangeDefaultLevel
        } else {
            ScheduleAction::RenameSchedule
        };
        let access =
            ScheduleGuard::authorize(db, caller, action, AccessTarget::Schedule(schedule_id))
                .await?;

        let schedule = sqlx::query_as::<_, Schedule>(
            r#"UPDATE schedules
               SET name = COALESCE($2, name),
                   default_permission_level = COALESCE($3, default_permission_level),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING id, name, owner_id, default_permission_level, created_at, updated_at"#,
        )
        .bind(schedule_id)
        .bind(dto.name.as_deref())
        .bind(dto.default_permission_level.map(i32::from))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Schedule not found")))?;

        if let Some(level) = dto.default_permission_level {
            info!(schedule_id = %schedule_id, level = level.value(), "Schedule default level changed");
        }

        let effective =
            PermissionLevel::resolve(schedule.default_permission_level, access.override_level);
        Ok(ScheduleView::new(schedule, effective))
    }

    /// Deletes the schedule. Events, comments and overrides cascade.
    #[instrument(skip(db))]
    pub async fn delete_schedule(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
    ) -> Result<(), AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::DeleteSchedule,
            AccessTarget::Schedule(schedule_id),
        )
        .await?;

        sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(schedule_id)
            .execute(db)
            .await?;

        info!(schedule_id = %schedule_id, "Schedule deleted");
        track_schedule_deleted();
        Ok(())
    }
}
