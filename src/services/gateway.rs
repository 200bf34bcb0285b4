use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::models::{ActionRecord, BlockRecord, ProfileRecord, UserFilters};
use crate::services::repository::{
    ActionRepository, BlockRepository, GatewayError, ProfileRepository, UserFiltersRepository,
};

/// HTTP client for the core app's internal API.
///
/// Implements all four collaborator repositories against the main backend:
/// - profile lookups and the pre-filtered eligible candidate pool
/// - swipe actions in both directions
/// - blocks involving a user
/// - per-user discovery filters
#[derive(Clone)]
pub struct CoreApiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ProfilesEnvelope {
    profiles: Vec<ProfileRecord>,
}

#[derive(Debug, Deserialize)]
struct ActionsEnvelope {
    actions: Vec<ActionRecord>,
}

#[derive(Debug, Deserialize)]
struct BlocksEnvelope {
    blocks: Vec<BlockRecord>,
}

impl CoreApiClient {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    async fn get(&self, path_and_query: &str) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        tracing::debug!("Gateway GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Internal-Api-Key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Unauthorized),
            status if status.is_server_error() => Err(GatewayError::ApiError(format!(
                "{} returned {}",
                path_and_query, status
            ))),
            _ => Ok(response),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path_and_query: &str,
    ) -> Result<T, GatewayError> {
        let response = self.get(path_and_query).await?;
        let status = response.status();
        // These resources always exist for a valid caller; a 404 here means
        // the route itself is wrong or gone, not an absent record.
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(path_and_query.to_string()));
        }
        if !status.is_success() {
            return Err(GatewayError::ApiError(format!(
                "{} returned {}",
                path_and_query, status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("{}: {}", path_and_query, e)))
    }

    /// GET returning `None` on 404, for resources that may legitimately be
    /// absent.
    async fn get_json_opt<T: serde::de::DeserializeOwned>(
        &self,
        path_and_query: &str,
    ) -> Result<Option<T>, GatewayError> {
        let response = self.get(path_and_query).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(GatewayError::ApiError(format!(
                "{} returned {}",
                path_and_query, status
            )));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| GatewayError::InvalidResponse(format!("{}: {}", path_and_query, e)))
    }
}

impl ProfileRepository for CoreApiClient {
    async fn load_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, GatewayError> {
        let path = format!("/internal/profiles/{}", urlencoding::encode(user_id));
        self.get_json_opt(&path).await
    }

    async fn load_eligible_candidates(
        &self,
        exclude_ids: &[String],
    ) -> Result<Vec<ProfileRecord>, GatewayError> {
        let exclude = urlencoding::encode(&exclude_ids.join(",")).into_owned();
        let path = format!("/internal/profiles/eligible?exclude={}", exclude);
        let envelope: ProfilesEnvelope = self.get_json(&path).await?;
        Ok(envelope.profiles)
    }
}

impl ActionRepository for CoreApiClient {
    async fn load_actions_from(&self, user_id: &str) -> Result<Vec<ActionRecord>, GatewayError> {
        let path = format!("/internal/actions?actor={}", urlencoding::encode(user_id));
        let envelope: ActionsEnvelope = self.get_json(&path).await?;
        Ok(envelope.actions)
    }

    async fn load_actions_to(&self, user_id: &str) -> Result<Vec<ActionRecord>, GatewayError> {
        let path = format!("/internal/actions?target={}", urlencoding::encode(user_id));
        let envelope: ActionsEnvelope = self.get_json(&path).await?;
        Ok(envelope.actions)
    }
}

impl BlockRepository for CoreApiClient {
    async fn load_blocks_involving(
        &self,
        user_id: &str,
    ) -> Result<Vec<BlockRecord>, GatewayError> {
        let path = format!("/internal/blocks?user={}", urlencoding::encode(user_id));
        let envelope: BlocksEnvelope = self.get_json(&path).await?;
        Ok(envelope.blocks)
    }
}

impl UserFiltersRepository for CoreApiClient {
    async fn load(&self, user_id: &str) -> Result<Option<UserFilters>, GatewayError> {
        let path = format!("/internal/filters/{}", urlencoding::encode(user_id));
        self.get_json_opt(&path).await
    }
}
