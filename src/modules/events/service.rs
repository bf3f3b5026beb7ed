use mimcal_core::AppError;
use mimcal_models::{
    CreateEventDto, EventType, EventView, StatusResponse, UpdateEventDto, event_types,
};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{AccessTarget, ScheduleAction, ScheduleGuard};
use crate::middleware::auth::Caller;
use crate::modules::engagement::EngagementService;

const EVENT_COLUMNS: &str = "e.id, e.schedule_id, e.type_id, e.title, e.description, \
     e.start_date, e.end_date, e.created_at, e.updated_at";

/// Whether the caller (`$1`, NULL when anonymous) marked event `e`.
const IS_CHECKED: &str = "EXISTS (SELECT 1 FROM event_marks m \
     WHERE m.event_id = e.id AND m.user_id = $1) AS is_checked";

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow::anyhow!("Unknown event type"));
        }
        if db_err.is_check_violation() {
            return AppError::bad_request(anyhow::anyhow!(
                "start_date must not be after end_date"
            ));
        }
    }
    AppError::from(e)
}

pub struct EventService;

impl EventService {
    #[instrument(skip(db))]
    pub async fn list_event_types(db: &PgPool) -> Result<Vec<EventType>, AppError> {
        let types = sqlx::query_as::<_, EventType>("SELECT id, name FROM event_types ORDER BY name")
            .fetch_all(db)
            .await?;
        Ok(types)
    }

    /// Events of a schedule, newest `start_date` first. Callers must have
    /// authorized access to the schedule already.
    #[instrument(skip(db))]
    pub(crate) async fn fetch_for_schedule(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<EventView>, AppError> {
        let query = format!(
            "SELECT {EVENT_COLUMNS}, {IS_CHECKED} FROM events e \
             WHERE e.schedule_id = $2 \
             ORDER BY e.start_date DESC, e.id \
             LIMIT $3"
        );

        let events = sqlx::query_as::<_, EventView>(&query)
            .bind(caller.user_id())
            .bind(schedule_id)
            .bind(limit)
            .fetch_all(db)
            .await?;

        Ok(events)
    }

    #[instrument(skip(db))]
    pub async fn list_schedule_events(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<EventView>, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::ListEvents,
            AccessTarget::Schedule(schedule_id),
        )
        .await?;

        Self::fetch_for_schedule(db, caller, schedule_id, limit).await
    }

    async fn fetch_view(db: &PgPool, caller: Caller, event_id: Uuid) -> Result<EventView, AppError> {
        let query = format!("SELECT {EVENT_COLUMNS}, {IS_CHECKED} FROM events e WHERE e.id = $2");

        sqlx::query_as::<_, EventView>(&query)
            .bind(caller.user_id())
            .bind(event_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Event not found")))
    }

    #[instrument(skip(db))]
    pub async fn create_event(
        db: &PgPool,
        caller: Caller,
        dto: CreateEventDto,
    ) -> Result<EventView, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::WriteEvent,
            AccessTarget::Schedule(dto.schedule_id),
        )
        .await?;

        let event_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO events (schedule_id, type_id, title, description, start_date, end_date)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(dto.schedule_id)
        .bind(dto.type_id.unwrap_or(event_types::LECTURE))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(db)
        .await
        .map_err(map_write_error)?;

        info!(event_id = %event_id, schedule_id = %dto.schedule_id, "Event created");

        Self::fetch_view(db, caller, event_id).await
    }

    #[instrument(skip(db))]
    pub async fn get_event(db: &PgPool, caller: Caller, event_id: Uuid) -> Result<EventView, AppError> {
        ScheduleGuard::authorize(db, caller, ScheduleAction::ReadEvent, AccessTarget::Event(event_id))
            .await?;

        Self::fetch_view(db, caller, event_id).await
    }

    /// Applies the fields present in `dto`. The resulting date range must
    /// still be ordered.
    #[instrument(skip(db))]
    pub async fn update_event(
        db: &PgPool,
        caller: Caller,
        event_id: Uuid,
        dto: UpdateEventDto,
    ) -> Result<EventView, AppError> {
        ScheduleGuard::authorize(db, caller, ScheduleAction::WriteEvent, AccessTarget::Event(event_id))
            .await?;

        sqlx::query(
            r#"UPDATE events
               SET type_id = COALESCE($2, type_id),
                   title = COALESCE($3, title),
                   description = COALESCE($4, description),
                   start_date = COALESCE($5, start_date),
                   end_date = COALESCE($6, end_date),
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(event_id)
        .bind(dto.type_id)
        .bind(dto.title.as_deref())
        .bind(dto.description.as_deref())
        .bind(dto.start_date)
        .bind(dto.end_date)
        .execute(db)
        .await
        .map_err(map_write_error)?;

        Self::fetch_view(db, caller, event_id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_event(db: &PgPool, caller: Caller, event_id: Uuid) -> Result<(), AppError> {
        ScheduleGuard::authorize(db, caller, ScheduleAction::WriteEvent, AccessTarget::Event(event_id))
            .await?;

        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(db)
            .await?;

        info!(event_id = %event_id, "Event deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn check_event(
        db: &PgPool,
        caller: Caller,
        event_id: Uuid,
    ) -> Result<StatusResponse, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::MarkAttendance,
            AccessTarget::Event(event_id),
        )
        .await?;

        EngagementService::mark(db, event_id, caller.require_user()?).await?;
        Ok(StatusResponse::new("event checked"))
    }

    #[instrument(skip(db))]
    pub async fn uncheck_event(
        db: &PgPool,
        caller: Caller,
        event_id: Uuid,
    ) -> Result<StatusResponse, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::MarkAttendance,
            AccessTarget::Event(event_id),
        )
        .await?;

        EngagementService::unmark(db, event_id, caller.require_user()?).await?;
        Ok(StatusResponse::new("event unchecked"))
    }
}
