//! # Mimcal Core
//!
//! Core types, errors, and utilities for the Mimcal API.
//!
//! This crate provides foundational types used throughout the Mimcal application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`permissions`]: Schedule permission levels and their precedence rule
//! - [`password`]: Secure password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use mimcal_core::errors::AppError;
//! use mimcal_core::permissions::PermissionLevel;
//!
//! let effective = PermissionLevel::resolve(schedule.default_permission_level, override_level);
//! if !effective.allows(PermissionLevel::ReadWrite) {
//!     return Err(AppError::access_denied(schedule.id));
//! }
//! ```

pub mod errors;
pub mod password;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorResponse};
pub use password::{hash_password, verify_password};
pub use permissions::{InvalidPermissionLevel, PermissionLevel};
