use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::SortMode;

/// Request to discover candidates for a user.
///
/// Accepted as either a JSON or a form-encoded body; both transports
/// deserialize into this one shape before the engine sees it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiscoverHttpRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub sort: SortMode,
    #[serde(alias = "deadline_ms", rename = "deadlineMs", default)]
    pub deadline_ms: Option<u64>,
}

fn default_limit() -> u16 {
    20
}
