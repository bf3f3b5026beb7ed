//! Schedule permission levels and the precedence rule that combines them.
//!
//! Access to a schedule is expressed as one of four ordered levels. A
//! schedule carries a default level that applies to every caller, including
//! anonymous ones, and a known user may additionally hold an explicit
//! override. The level a caller actually holds is the higher of the two.
//!
//! ```text
//! RESTRICTED (0) < READ (1) < READ_WRITE (2) < MANAGE (3)
//! ```
//!
//! # Example
//!
//! ```
//! use mimcal_core::permissions::PermissionLevel;
//!
//! let default = PermissionLevel::Read;
//! let effective = PermissionLevel::resolve(default, Some(PermissionLevel::Manage));
//! assert!(effective.allows(PermissionLevel::ReadWrite));
//!
//! // No override: the default applies unchanged.
//! assert_eq!(PermissionLevel::resolve(default, None), PermissionLevel::Read);
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;

/// Serialized as its integer value. Deserialization also accepts the value
/// as a numeric string (`"2"`), which form-style clients send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "i32")]
pub enum PermissionLevel {
    #[default]
    Restricted = 0,
    Read = 1,
    ReadWrite = 2,
    Manage = 3,
}

/// Raised when an integer does not name a permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid permission level {0}, expected a value between 0 and 3")]
pub struct InvalidPermissionLevel(pub i32);

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 4] = [
        PermissionLevel::Restricted,
        PermissionLevel::Read,
        PermissionLevel::ReadWrite,
        PermissionLevel::Manage,
    ];

    /// Effective level for a caller: the schedule default acts as a floor
    /// that an override can only raise.
    #[must_use]
    pub fn resolve(default: PermissionLevel, override_level: Option<PermissionLevel>) -> Self {
        match override_level {
            Some(level) => default.max(level),
            None => default,
        }
    }

    /// Whether holding `self` satisfies a `required` level.
    #[must_use]
    pub fn allows(self, required: PermissionLevel) -> bool {
        self >= required
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PermissionLevel::Restricted => "Restricted access",
            PermissionLevel::Read => "Read access",
            PermissionLevel::ReadWrite => "Read and write access",
            PermissionLevel::Manage => "Manage access",
        }
    }
}

impl TryFrom<i32> for PermissionLevel {
    type Error = InvalidPermissionLevel;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PermissionLevel::Restricted),
            1 => Ok(PermissionLevel::Read),
            2 => Ok(PermissionLevel::ReadWrite),
            3 => Ok(PermissionLevel::Manage),
            other => Err(InvalidPermissionLevel(other)),
        }
    }
}

impl From<PermissionLevel> for i32 {
    fn from(level: PermissionLevel) -> Self {
        level.value()
    }
}

impl<'de> Deserialize<'de> for PermissionLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        let value = match Raw::deserialize(deserializer)? {
            Raw::Int(value) => value,
            Raw::Str(value) => value
                .trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid permission level {value:?}")))?,
        };

        i32::try_from(value)
            .ok()
            .and_then(|value| PermissionLevel::try_from(value).ok())
            .ok_or_else(|| {
                de::Error::custom(format!(
                    "invalid permission level {value}, expected a value between 0 and 3"
                ))
            })
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
