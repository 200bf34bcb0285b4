use thiserror::Error;

use crate::models::{ActionRecord, BlockRecord, ProfileRecord, UserFilters};

/// Errors surfaced by the collaborator repositories.
///
/// These are the retryable infrastructure category: the engine never retries
/// them itself, it fails the whole discovery call and leaves retry policy to
/// the caller or the client layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Profiles, owned by the profile-editing subsystem.
#[allow(async_fn_in_trait)]
pub trait ProfileRepository {
    /// The requester's own profile, `None` when it does not exist.
    async fn load_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, GatewayError>;

    /// Candidate pool with eligibility flags pre-applied by the owner.
    async fn load_eligible_candidates(
        &self,
        exclude_ids: &[String],
    ) -> Result<Vec<ProfileRecord>, GatewayError>;
}

/// Swipe actions, owned by the swipe subsystem.
#[allow(async_fn_in_trait)]
pub trait ActionRepository {
    async fn load_actions_from(&self, user_id: &str) -> Result<Vec<ActionRecord>, GatewayError>;
    async fn load_actions_to(&self, user_id: &str) -> Result<Vec<ActionRecord>, GatewayError>;
}

/// Blocks, owned by the blocking subsystem.
#[allow(async_fn_in_trait)]
pub trait BlockRepository {
    /// Every block where the user is on either side.
    async fn load_blocks_involving(&self, user_id: &str)
        -> Result<Vec<BlockRecord>, GatewayError>;
}

/// Per-user discovery filters; `None` means the user never set any.
#[allow(async_fn_in_trait)]
pub trait UserFiltersRepository {
    async fn load(&self, user_id: &str) -> Result<Option<UserFilters>, GatewayError>;
}
