// Core engine exports
pub mod discovery;
pub mod distance;
pub mod exclusions;
pub mod filters;
pub mod scoring;

pub use discovery::{
    DiscoverRequest, DiscoveryError, DiscoveryOrchestrator, DiscoveryPage, MAX_PAGE_SIZE,
};
pub use distance::{distance_km_between, haversine_km, km_to_miles};
pub use exclusions::{exclusion_union, ExclusionSetResolver};
pub use filters::{age_in_years, mutual_gender_match, FilterEngine, FilteredCandidate};
pub use scoring::CompatibilityScorer;
