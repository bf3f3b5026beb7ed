//! JWT verification settings.
//!
//! Tokens are issued by the identity provider and signed with the shared
//! `JWT_SECRET`. Mimcal only needs the secret to verify them; the expiry is
//! used when the CLI mints development tokens.

use crate::{env_lookup, parse_or};

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            secret: lookup("JWT_SECRET")
                .unwrap_or_else(|| "your-secret-key-change-in-production".to_string()),
            access_token_expiry: parse_or(&lookup, "JWT_ACCESS_EXPIRY", 3600), // 1 hour
        }
    }
}
