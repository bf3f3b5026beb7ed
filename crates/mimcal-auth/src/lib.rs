//! # Mimcal Auth
//!
//! Identity tokens for the Mimcal API.
//!
//! Mimcal does not run a login flow of its own. Callers present an HS256
//! bearer token issued by the identity provider, signed with the shared
//! `JWT_SECRET`, whose `sub` claim is the user's id. This crate provides:
//!
//! - [`claims`]: the access token claim structure
//! - [`jwt`]: token verification, plus token creation for the admin CLI and tests
//!
//! # Example
//!
//! ```ignore
//! use mimcal_auth::{create_access_token, verify_token};
//! use mimcal_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "alice", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.username, "alice");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
