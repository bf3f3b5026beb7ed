//! Event models and DTOs.
//!
//! Events belong to exactly one schedule and are always listed newest
//! `start_date` first. Each event tracks the set of users who marked it
//! (attendance); callers only ever see whether they themselves marked it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Well-known event type identifiers seeded by the migrations.
pub mod event_types {
    use uuid::Uuid;

    /// The default type assigned when a new event does not name one.
    pub const LECTURE: Uuid = Uuid::from_u128(1);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventType {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub type_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event together with whether the caller marked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct EventView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub is_checked: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_event_range"))]
pub struct CreateEventDto {
    pub schedule_id: Uuid,
    /// Defaults to the `lecture` type.
    pub type_id: Option<Uuid>,
    #[validate(length(min = 1, max = 512, message = "title must be 1-512 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 4096, message = "description must be at most 4096 characters"))]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEventDto {
    pub type_id: Option<Uuid>,
    #[validate(length(min = 1, max = 512, message = "title must be 1-512 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 4096, message = "description must be at most 4096 characters"))]
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Query parameters for listing a schedule's events.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EventListParams {
    /// Return at most `n` events (newest first).
    pub n: Option<i64>,
}

impl EventListParams {
    /// The row limit to apply, if any. Negative values are treated as zero.
    pub fn limit(&self) -> Option<i64> {
        self.n.map(|n| n.max(0))
    }
}

/// Checks that an event does not end before it starts.
pub fn validate_date_range(
    start_date: &DateTime<Utc>,
    end_date: &DateTime<Utc>,
) -> Result<(), ValidationError> {
    if start_date <= end_date {
        return Ok(());
    }

    let mut error = ValidationError::new("date_range");
    error.message = Some("start_date must not be after end_date".into());
    Err(error)
}

fn validate_create_event_range(dto: &CreateEventDto) -> Result<(), ValidationError> {
    validate_date_range(&dto.start_date, &dto.end_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_dto(start: DateTime<Utc>, end: DateTime<Utc>) -> CreateEventDto {
        CreateEventDto {
            schedule_id: Uuid::new_v4(),
            type_id: None,
            title: "Linear algebra".to_string(),
            description: String::new(),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_lecture_type_id_is_stable() {
        assert_eq!(
            event_types::LECTURE.to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn test_create_event_rejects_inverted_range() {
        let now = Utc::now();
        assert!(create_dto(now, now).validate().is_ok());
        assert!(create_dto(now, now + Duration::hours(2)).validate().is_ok());
        assert!(create_dto(now, now - Duration::minutes(1)).validate().is_err());
    }

    #[test]
    fn test_description_defaults_to_empty() {
        let dto: CreateEventDto = serde_json::from_value(serde_json::json!({
            "schedule_id": Uuid::new_v4(),
            "title": "Lab",
            "start_date": "2026-03-01T10:00:00Z",
            "end_date": "2026-03-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(dto.description, "");
        assert!(dto.type_id.is_none());
    }

    #[test]
    fn test_list_params_limit() {
        assert_eq!(EventListParams { n: None }.limit(), None);
        assert_eq!(EventListParams { n: Some(5) }.limit(), Some(5));
        assert_eq!(EventListParams { n: Some(-3) }.limit(), Some(0));
    }

    #[test]
    fn test_event_view_serializes_flat() {
        let now = Utc::now();
        let view = EventView {
            event: Event {
                id: Uuid::new_v4(),
                schedule_id: Uuid::new_v4(),
                type_id: event_types::LECTURE,
                title: "Lab".to_string(),
                description: String::new(),
                start_date: now,
                end_date: now,
                created_at: now,
                updated_at: now,
            },
            is_checked: true,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["title"], "Lab");
        assert_eq!(value["is_checked"], true);
    }
}
