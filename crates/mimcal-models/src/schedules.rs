//! Schedule models and DTOs.
//!
//! A schedule is a named collection of events owned by one user. Its
//! `default_permission_level` applies to every caller, including anonymous
//! ones; per-user overrides live in [`crate::permissions`].

use chrono::{DateTime, Utc};
use mimcal_core::PermissionLevel;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::events::EventView;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Schedule {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    #[sqlx(try_from = "i32")]
    #[schema(value_type = i32, minimum = 0, maximum = 3)]
    pub default_permission_level: PermissionLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A schedule as seen by a particular caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScheduleView {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    #[schema(value_type = i32, minimum = 0, maximum = 3)]
    pub default_permission_level: PermissionLevel,
    /// The caller's effective level on this schedule.
    #[schema(value_type = i32, minimum = 0, maximum = 3)]
    pub my_permission_level: PermissionLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleView {
    pub fn new(schedule: Schedule, my_permission_level: PermissionLevel) -> Self {
        Self {
            id: schedule.id,
            name: schedule.name,
            owner_id: schedule.owner_id,
            default_permission_level: schedule.default_permission_level,
            my_permission_level,
            created_at: schedule.created_at,
            updated_at: schedule.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduleWithEvents {
    #[serde(flatten)]
    pub schedule: ScheduleView,
    pub events: Vec<EventView>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateScheduleDto {
    #[validate(length(min = 1, max = 512, message = "name must be 1-512 characters"))]
    pub name: String,
    #[schema(value_type = i32, minimum = 0, maximum = 3)]
    pub default_permission_level: PermissionLevel,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateScheduleDto {
    #[validate(length(min = 1, max = 512, message = "name must be 1-512 characters"))]
    pub name: Option<String>,
    #[schema(value_type = Option<i32>, minimum = 0, maximum = 3)]
    pub default_permission_level: Option<PermissionLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_schedule_dto_accepts_string_level() {
        let dto: CreateScheduleDto =
            serde_json::from_str(r#"{"name":"test_schedule","default_permission_level":"1"}"#)
                .unwrap();
        assert_eq!(dto.default_permission_level, PermissionLevel::Read);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_schedule_dto_rejects_unknown_level() {
        let result = serde_json::from_str::<CreateScheduleDto>(
            r#"{"name":"test_schedule","default_permission_level":9}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_create_schedule_dto_rejects_empty_name() {
        let dto = CreateScheduleDto {
            name: String::new(),
            default_permission_level: PermissionLevel::Read,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_schedule_with_events_flattens_schedule() {
        let now = Utc::now();
        let schedule = Schedule {
            id: Uuid::new_v4(),
            name: "Algebra".to_string(),
            owner_id: Uuid::new_v4(),
            default_permission_level: PermissionLevel::Read,
            created_at: now,
            updated_at: now,
        };
        let body = ScheduleWithEvents {
            schedule: ScheduleView::new(schedule, PermissionLevel::Manage),
            events: vec![],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["name"], "Algebra");
        assert_eq!(value["default_permission_level"], 1);
        assert_eq!(value["my_permission_level"], 3);
        assert!(value["events"].as_array().unwrap().is_empty());
    }
}
