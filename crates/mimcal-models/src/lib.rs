//! # Mimcal Models
//!
//! Domain models and DTOs for the Mimcal API.
//!
//! This crate provides the data structures used throughout the Mimcal
//! application: database rows (`sqlx::FromRow`), request DTOs (validated
//! with `validator`), and viewer-relative response shapes (documented with
//! `utoipa`).
//!
//! # Modules
//!
//! - [`users`]: Users and registration
//! - [`schedules`]: Schedules and their default permission level
//! - [`permissions`]: Per-user permission overrides
//! - [`events`]: Events, event types, and attendance marks
//! - [`comments`]: Comments, replies, and likes
//! - [`responses`]: Small status payloads shared by action endpoints

pub mod comments;
pub mod events;
pub mod permissions;
pub mod responses;
pub mod schedules;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use comments::{
    Comment, CommentReply, CommentView, CreateCommentDto, CreateReplyDto, LikeResponse,
    ReplyView, UpdateCommentDto,
};
pub use events::{
    CreateEventDto, Event, EventListParams, EventType, EventView, UpdateEventDto, event_types,
};
pub use permissions::{GrantPermissionDto, PermissionChangeResponse, SchedulePermission};
pub use responses::StatusResponse;
pub use schedules::{
    CreateScheduleDto, Schedule, ScheduleView, ScheduleWithEvents, UpdateScheduleDto,
};
pub use users::{ProfileResponse, RegisterUserDto, User};
