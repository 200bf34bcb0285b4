// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ActionKind, ActionRecord, BlockRecord, CompatibilityBreakdown, EmptyReason,
    MatchingDefaults, ProfileAttributes, ProfileRecord, ScoredCandidate, ScoringWeights,
    SortMode, UserFilters,
};
pub use requests::DiscoverHttpRequest;
pub use responses::{DiscoverResponse, ErrorResponse, HealthResponse};
