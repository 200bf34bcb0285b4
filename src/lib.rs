//! Ember Discovery - discovery and compatibility matching engine for the
//! Ember dating app.
//!
//! This library decides, for a given user, which other users may be surfaced
//! next, in what order, and why none were found when applicable. It is a
//! stateless read-only pipeline over data supplied by external collaborators
//! (profiles, swipe actions, blocks, per-user filters).

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    CompatibilityScorer, DiscoverRequest, DiscoveryError, DiscoveryOrchestrator, DiscoveryPage,
    FilterEngine,
};
pub use models::{
    CompatibilityBreakdown, EmptyReason, MatchingDefaults, ProfileRecord, ScoredCandidate,
    ScoringWeights, SortMode, UserFilters,
};
