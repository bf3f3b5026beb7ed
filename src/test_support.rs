//! Fixtures shared by the service tests.

use chrono::{Duration, Utc};
use mimcal_core::PermissionLevel;
use mimcal_models::{CreateEventDto, CreateScheduleDto};
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::PermissionStore;
use crate::middleware::auth::Caller;
use crate::modules::events::service::EventService;
use crate::modules::schedules::service::ScheduleService;

pub async fn create_user(pool: &PgPool, username: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO users (username, password_hash) VALUES ($1, 'x') RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_schedule(pool: &PgPool, owner_id: Uuid, default: PermissionLevel) -> Uuid {
    ScheduleService::create_schedule(
        pool,
        owner_id,
        CreateScheduleDto {
            name: "Algebra".to_string(),
            default_permission_level: default,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn grant(pool: &PgPool, schedule_id: Uuid, user_id: Uuid, level: PermissionLevel) {
    PermissionStore::set_override(pool, schedule_id, user_id, level)
        .await
        .unwrap();
}

pub fn event_dto(schedule_id: Uuid, title: &str, days_from_now: i64) -> CreateEventDto {
    let start = Utc::now() + Duration::days(days_from_now);
    CreateEventDto {
        schedule_id,
        type_id: None,
        title: title.to_string(),
        description: String::new(),
        start_date: start,
        end_date: start + Duration::hours(2),
    }
}

/// Creates an event as the schedule owner.
pub async fn create_event(pool: &PgPool, owner_id: Uuid, schedule_id: Uuid) -> Uuid {
    EventService::create_event(
        pool,
        Caller::User(owner_id),
        event_dto(schedule_id, "Lecture 1", 1),
    )
    .await
    .unwrap()
    .event
    .id
}
