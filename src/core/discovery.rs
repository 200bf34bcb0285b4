use std::cmp::Ordering;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::exclusions::ExclusionSetResolver;
use crate::core::filters::FilterEngine;
use crate::core::scoring::CompatibilityScorer;
use crate::models::{
    EmptyReason, MatchingDefaults, ScoredCandidate, ScoringWeights, SortMode, UserFilters,
};
use crate::services::{
    ActionRepository, BlockRepository, GatewayError, ProfileRepository, UserFiltersRepository,
};

/// Hard cap on page size, enforced before any collaborator work begins.
pub const MAX_PAGE_SIZE: usize = 100;

/// One typed discovery request, regardless of the transport it arrived on.
#[derive(Debug, Clone)]
pub struct DiscoverRequest {
    pub user_id: String,
    pub limit: usize,
    pub offset: usize,
    pub sort: SortMode,
    /// Remaining time budget for the collaborator reads. Expiry aborts the
    /// outstanding reads and fails the call.
    pub deadline: Option<Duration>,
}

impl DiscoverRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            limit: 20,
            offset: 0,
            sort: SortMode::default(),
            deadline: None,
        }
    }
}

/// Result of a discovery call. A populated `empty_reason` with zero items is
/// the diagnostic (non-error) path.
#[derive(Debug, Clone)]
pub struct DiscoveryPage {
    pub items: Vec<ScoredCandidate>,
    pub total: usize,
    pub empty_reason: Option<EmptyReason>,
}

impl DiscoveryPage {
    fn empty(reason: EmptyReason) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            empty_reason: Some(reason),
        }
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("collaborator call failed: {0}")]
    Upstream(#[from] GatewayError),

    #[error("deadline exceeded before collaborator reads completed")]
    DeadlineExceeded,
}

/// Top-level entry point of the engine: loads requester context, runs the
/// filter pipeline, scores survivors, sorts and paginates.
///
/// Every discovery surface (grid browse, geo-nearby, mobile feed) goes
/// through this one orchestrator so gender and exclusion logic cannot drift
/// between them. Each call is a stateless read-only pass; calls for
/// different users may run fully in parallel.
pub struct DiscoveryOrchestrator<P, A, B, F> {
    profiles: P,
    actions: A,
    blocks: B,
    filters: F,
    filter_engine: FilterEngine,
    scorer: CompatibilityScorer,
}

impl<P, A, B, F> DiscoveryOrchestrator<P, A, B, F>
where
    P: ProfileRepository,
    A: ActionRepository,
    B: BlockRepository,
    F: UserFiltersRepository,
{
    pub fn new(
        profiles: P,
        actions: A,
        blocks: B,
        filters: F,
        defaults: MatchingDefaults,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            profiles,
            actions,
            blocks,
            filters,
            filter_engine: FilterEngine::new(defaults),
            scorer: CompatibilityScorer::new(weights, defaults),
        }
    }

    /// Run one discovery pass for the requester.
    ///
    /// Performs no mutation and no retries; any collaborator failure fails
    /// the whole call rather than returning partial results, because an
    /// incomplete exclusion read is a safety risk.
    pub async fn discover(
        &self,
        request: &DiscoverRequest,
    ) -> Result<DiscoveryPage, DiscoveryError> {
        if request.limit == 0 || request.limit > MAX_PAGE_SIZE {
            return Err(DiscoveryError::InvalidRequest(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, request.limit
            )));
        }
        if request.user_id.is_empty() {
            return Err(DiscoveryError::InvalidRequest(
                "user_id must not be empty".to_string(),
            ));
        }

        let requester = match self.profiles.load_profile(&request.user_id).await? {
            Some(profile) => profile,
            None => {
                tracing::info!("No profile for requester {}", request.user_id);
                return Ok(DiscoveryPage::empty(EmptyReason::ProfileNotFound));
            }
        };

        if requester.suspended {
            return Ok(DiscoveryPage::empty(EmptyReason::UserInactive));
        }
        if !requester.is_complete_for_matching() {
            return Ok(DiscoveryPage::empty(EmptyReason::IncompleteProfile));
        }

        // The three reads are independent; only the requester's own id is
        // passed to the pool query, the full exclusion set is re-applied in
        // the filter pass.
        let own_id = [request.user_id.clone()];
        let resolver = ExclusionSetResolver::new(&self.actions, &self.blocks);
        let loads = async {
            tokio::try_join!(
                resolver.resolve(&request.user_id),
                self.profiles.load_eligible_candidates(&own_id),
                self.filters.load(&request.user_id),
            )
        };

        let (excluded, pool, filters) = match request.deadline {
            Some(budget) => tokio::time::timeout(budget, loads)
                .await
                .map_err(|_| DiscoveryError::DeadlineExceeded)??,
            None => loads.await?,
        };
        let filters = filters.unwrap_or_else(UserFilters::default);

        tracing::debug!(
            "Requester {}: {} candidates, {} excluded ids",
            request.user_id,
            pool.len(),
            excluded.len()
        );

        let now = Utc::now();
        let survivors =
            self.filter_engine
                .apply(&requester, &filters, &excluded, pool, now.date_naive());

        if survivors.is_empty() {
            return Ok(DiscoveryPage::empty(EmptyReason::NoMatches));
        }

        let mut ranked: Vec<Ranked> = survivors
            .into_iter()
            .map(|candidate| {
                let compatibility = self.scorer.score(&requester, &filters, &candidate, now);
                Ranked {
                    last_active_at: candidate.profile.last_active_at,
                    candidate: ScoredCandidate {
                        candidate_id: candidate.profile.user_id,
                        distance_km: candidate.distance_km,
                        age_years: candidate.age_years,
                        compatibility,
                    },
                }
            })
            .collect();

        match request.sort {
            SortMode::Compatibility => ranked.sort_by(compare_by_compatibility),
            SortMode::Distance => ranked.sort_by(compare_by_distance),
        }

        let total = ranked.len();
        let items = ranked
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|r| r.candidate)
            .collect();

        Ok(DiscoveryPage {
            items,
            total,
            empty_reason: None,
        })
    }
}

struct Ranked {
    candidate: ScoredCandidate,
    last_active_at: Option<DateTime<Utc>>,
}

/// Total descending, then last activity descending (unknown last), then id
/// ascending so identical-score pages stay stable across calls.
fn compare_by_compatibility(a: &Ranked, b: &Ranked) -> Ordering {
    b.candidate
        .compatibility
        .total
        .cmp(&a.candidate.compatibility.total)
        .then_with(|| b.last_active_at.cmp(&a.last_active_at))
        .then_with(|| a.candidate.candidate_id.cmp(&b.candidate.candidate_id))
}

/// Distance ascending with unknown distances last, then total descending,
/// then id ascending.
fn compare_by_distance(a: &Ranked, b: &Ranked) -> Ordering {
    let by_distance = match (a.candidate.distance_km, b.candidate.distance_km) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_distance
        .then_with(|| {
            b.candidate
                .compatibility
                .total
                .cmp(&a.candidate.compatibility.total)
        })
        .then_with(|| a.candidate.candidate_id.cmp(&b.candidate.candidate_id))
}
