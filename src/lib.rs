//! # Mimcal API
//!
//! A REST backend for shared calendars, built with Axum and PostgreSQL.
//! Users own schedules, schedules hold events, and events collect
//! attendance marks, comments, replies and likes.
//!
//! ## Access model
//!
//! Every schedule carries a default permission level that applies to all
//! callers, anonymous ones included. A registered user may also hold an
//! explicit override on a schedule. The level a caller effectively holds is
//! the higher of the two, so the default is a floor that overrides can only
//! raise:
//!
//! ```text
//! RESTRICTED (0) < READ (1) < READ_WRITE (2) < MANAGE (3)
//! ```
//!
//! Anything attached to a schedule (events, comments, replies, likes and
//! attendance marks) inherits the schedule's access decision. A schedule the
//! caller cannot read is reported as missing (404); a readable schedule on
//! which the requested action needs a higher level yields 403 with the id of
//! the refused object.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── access/       # Level resolution, override storage, the schedule guard
//! ├── middleware/   # Bearer-token extractors (AuthUser, Caller)
//! ├── modules/      # Feature modules: controller, router, service
//! │   ├── auth/         # Registration
//! │   ├── users/        # Current user profile
//! │   ├── schedules/    # Schedules and their settings
//! │   ├── permissions/  # Per-user overrides
//! │   ├── events/       # Events, event types, attendance marks
//! │   ├── comments/     # Comments and comment likes
//! │   ├── replies/      # Replies and reply likes
//! │   └── engagement/   # Shared mark/like storage
//! ├── docs.rs       # OpenAPI document
//! ├── router.rs     # Application router
//! ├── state.rs      # Shared application state
//! └── validator.rs  # Validated JSON extractor
//! ```
//!
//! Data models live in the `mimcal-models` crate; the error type and the
//! permission level enum live in `mimcal-core`.
//!
//! ## API Documentation
//!
//! When the server is running:
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod access;
pub mod docs;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export workspace crates for convenience
pub use mimcal_auth;
pub use mimcal_config;
pub use mimcal_core;
pub use mimcal_db;
pub use mimcal_models;
