//! Request extractors for caller identity.
//!
//! - [`auth::AuthUser`]: a verified bearer token is required (401 otherwise)
//! - [`auth::Caller`]: the bearer token is optional; requests without an
//!   `Authorization` header are treated as anonymous, while a malformed or
//!   expired token is still rejected with 401
//!
//! Schedule-level authorization happens in [`crate::access`], not here.

pub mod auth;
