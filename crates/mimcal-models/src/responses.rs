use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Acknowledgement returned by action endpoints such as check/uncheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}
