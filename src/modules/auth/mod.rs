//! Account registration.
//!
//! Access tokens are issued by the identity provider; this module only
//! creates the user records those tokens refer to.

pub mod controller;
pub mod router;
pub mod service;
