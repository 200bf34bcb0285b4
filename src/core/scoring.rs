use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::core::distance::km_to_miles;
use crate::core::filters::FilteredCandidate;
use crate::models::{
    CompatibilityBreakdown, MatchingDefaults, ProfileRecord, ScoringWeights, UserFilters,
};

/// Sub-score used when a signal is unavailable on either side.
const NEUTRAL_SCORE: f64 = 50.0;

/// Produces the six compatibility sub-scores and their weighted total for
/// one requester/candidate pair.
///
/// Scoring formula:
/// total = location * 0.25 + age * 0.15 + interests * 0.20
///       + lifestyle * 0.20 + verification * 0.10 + activity * 0.10
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityScorer {
    weights: ScoringWeights,
    defaults: MatchingDefaults,
}

impl CompatibilityScorer {
    pub fn new(weights: ScoringWeights, defaults: MatchingDefaults) -> Self {
        Self { weights, defaults }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), MatchingDefaults::default())
    }

    pub fn score(
        &self,
        requester: &ProfileRecord,
        filters: &UserFilters,
        candidate: &FilteredCandidate,
        now: DateTime<Utc>,
    ) -> CompatibilityBreakdown {
        let (min_age, max_age) = filters.age_bounds(self.defaults);
        let cutoff_miles = filters.distance_cutoff_miles(self.defaults);

        let location = location_score(candidate.distance_km, cutoff_miles);
        let age = age_score(candidate.age_years, min_age, max_age);
        let interests = interests_score(
            &requester.attributes.interests,
            &candidate.profile.attributes.interests,
        );
        let lifestyle = lifestyle_score(requester, &candidate.profile);
        let verification = if candidate.profile.is_verified { 100.0 } else { 0.0 };
        let activity = activity_score(candidate.profile.last_active_at, now);

        let total = (location * self.weights.location
            + age * self.weights.age
            + interests * self.weights.interests
            + lifestyle * self.weights.lifestyle
            + verification * self.weights.verification
            + activity * self.weights.activity)
            .clamp(0.0, 100.0)
            .round() as u8;

        CompatibilityBreakdown {
            location,
            age,
            interests,
            lifestyle,
            verification,
            activity,
            total,
        }
    }
}

/// Location sub-score: neutral when the distance is unknown, zero beyond the
/// cutoff, otherwise linear in the remaining distance budget.
#[inline]
pub fn location_score(distance_km: Option<f64>, max_distance_miles: f64) -> f64 {
    let Some(km) = distance_km else {
        return NEUTRAL_SCORE;
    };
    if max_distance_miles <= 0.0 {
        return 0.0;
    }
    let miles = km_to_miles(km);
    if miles > max_distance_miles {
        return 0.0;
    }
    (100.0 * (1.0 - miles / max_distance_miles)).max(0.0)
}

/// Age sub-score: binary confirmation of the window already enforced by the
/// filter pass, neutral when the candidate's age is unknown.
#[inline]
pub fn age_score(age_years: Option<u8>, min_age: u8, max_age: u8) -> f64 {
    match age_years {
        None => NEUTRAL_SCORE,
        Some(age) if age < min_age || age > max_age => 0.0,
        Some(_) => 100.0,
    }
}

/// Jaccard similarity over case-insensitive interest sets, neutral when
/// either side has no interests recorded.
pub fn interests_score(requester: &[String], candidate: &[String]) -> f64 {
    if requester.is_empty() || candidate.is_empty() {
        return NEUTRAL_SCORE;
    }

    let a: HashSet<String> = requester.iter().map(|s| s.to_ascii_lowercase()).collect();
    let b: HashSet<String> = candidate.iter().map(|s| s.to_ascii_lowercase()).collect();

    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    if union == 0 {
        return NEUTRAL_SCORE;
    }

    intersection as f64 / union as f64 * 100.0
}

/// Lifestyle sub-score: average over the pairwise dimensions present on both
/// sides (smoking, drinking, wants-kids, exercise), neutral when none are.
pub fn lifestyle_score(requester: &ProfileRecord, candidate: &ProfileRecord) -> f64 {
    let ra = &requester.attributes;
    let ca = &candidate.attributes;

    let mut scores = Vec::with_capacity(4);

    if let (Some(a), Some(b)) = (ra.smoking.as_deref(), ca.smoking.as_deref()) {
        scores.push(habit_pair_score(a, b));
    }
    if let (Some(a), Some(b)) = (ra.drinking.as_deref(), ca.drinking.as_deref()) {
        scores.push(habit_pair_score(a, b));
    }
    if let (Some(a), Some(b)) = (ra.wants_kids.as_deref(), ca.wants_kids.as_deref()) {
        scores.push(kids_pair_score(a, b));
    }
    if let (Some(a), Some(b)) = (ra.exercise.as_deref(), ca.exercise.as_deref()) {
        scores.push(exercise_pair_score(a, b));
    }

    if scores.is_empty() {
        return NEUTRAL_SCORE;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Smoking/drinking: exact match is full marks; a "never" on exactly one side
/// is a hard mismatch; anything else is partial compatibility.
#[inline]
fn habit_pair_score(a: &str, b: &str) -> f64 {
    if a.eq_ignore_ascii_case(b) {
        return 100.0;
    }
    let a_never = a.eq_ignore_ascii_case("never");
    let b_never = b.eq_ignore_ascii_case("never");
    if a_never != b_never {
        20.0
    } else {
        60.0
    }
}

/// Wants-kids: a direct yes/no conflict scores zero; undecided answers keep
/// partial compatibility.
#[inline]
fn kids_pair_score(a: &str, b: &str) -> f64 {
    if a.eq_ignore_ascii_case(b) {
        return 100.0;
    }
    let a_yes = a.eq_ignore_ascii_case("yes");
    let a_no = a.eq_ignore_ascii_case("no");
    let b_yes = b.eq_ignore_ascii_case("yes");
    let b_no = b.eq_ignore_ascii_case("no");
    if (a_yes && b_no) || (a_no && b_yes) {
        0.0
    } else {
        70.0
    }
}

/// Exercise frequency: "never" against a frequent exerciser is the same hard
/// mismatch as the other habits.
#[inline]
fn exercise_pair_score(a: &str, b: &str) -> f64 {
    if a.eq_ignore_ascii_case(b) {
        return 100.0;
    }
    let frequent = |s: &str| s.eq_ignore_ascii_case("often") || s.eq_ignore_ascii_case("daily");
    let a_never = a.eq_ignore_ascii_case("never");
    let b_never = b.eq_ignore_ascii_case("never");
    if (a_never && frequent(b)) || (b_never && frequent(a)) {
        20.0
    } else {
        60.0
    }
}

/// Activity sub-score: recency buckets over last_active_at, neutral when the
/// signal is missing.
pub fn activity_score(last_active_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(last_active) = last_active_at else {
        return NEUTRAL_SCORE;
    };

    let days = (now - last_active).num_days().max(0);
    match days {
        0..=1 => 100.0,
        2..=3 => 85.0,
        4..=7 => 70.0,
        8..=14 => 55.0,
        15..=30 => 40.0,
        31..=90 => 25.0,
        _ => 10.0,
    }
}
