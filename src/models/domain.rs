use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Profile record as owned by the profile-editing subsystem.
///
/// The engine only reads these; it never creates or mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub gender: String,
    #[serde(rename = "lookingFor", default)]
    pub looking_for: Vec<String>,
    #[serde(rename = "dateOfBirth", default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub attributes: ProfileAttributes,
    #[serde(rename = "isVerified", default)]
    pub is_verified: bool,
    #[serde(rename = "lastActiveAt", default)]
    pub last_active_at: Option<DateTime<Utc>>,
    #[serde(rename = "canStartMatching", default)]
    pub can_start_matching: bool,
    #[serde(rename = "profileHidden", default)]
    pub profile_hidden: bool,
    #[serde(default)]
    pub suspended: bool,
}

impl ProfileRecord {
    /// Whether this profile may ever appear as a candidate.
    pub fn is_eligible(&self) -> bool {
        self.can_start_matching && !self.profile_hidden && !self.suspended
    }

    /// Both coordinates, or nothing. Callers must not treat a missing
    /// coordinate pair as "distance zero".
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Gender and looking_for are both required before the profile can
    /// participate in bidirectional matching.
    pub fn is_complete_for_matching(&self) -> bool {
        !self.gender.is_empty() && !self.looking_for.is_empty()
    }
}

/// Free-form lifestyle and demographic attributes on a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileAttributes {
    #[serde(rename = "bodyType", default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub religion: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub smoking: Option<String>,
    #[serde(default)]
    pub drinking: Option<String>,
    #[serde(default)]
    pub marijuana: Option<String>,
    #[serde(rename = "hasKids", default)]
    pub has_kids: Option<String>,
    #[serde(rename = "wantsKids", default)]
    pub wants_kids: Option<String>,
    #[serde(default)]
    pub exercise: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(rename = "zodiacSign", default)]
    pub zodiac_sign: Option<String>,
}

/// Per-user discovery constraints. Every field is optional; an unset
/// dimension imposes no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilters {
    #[serde(rename = "minAge", default)]
    pub min_age: Option<u8>,
    #[serde(rename = "maxAge", default)]
    pub max_age: Option<u8>,
    #[serde(rename = "maxDistanceMiles", default)]
    pub max_distance_miles: Option<f64>,
    #[serde(rename = "bodyTypes", default)]
    pub body_types: Vec<String>,
    #[serde(default)]
    pub ethnicities: Vec<String>,
    #[serde(default)]
    pub religions: Vec<String>,
    #[serde(rename = "educationLevels", default)]
    pub education_levels: Vec<String>,
    #[serde(default)]
    pub smoking: Option<String>,
    #[serde(default)]
    pub drinking: Option<String>,
    #[serde(default)]
    pub marijuana: Option<String>,
    #[serde(rename = "hasKids", default)]
    pub has_kids: Option<String>,
    #[serde(rename = "wantsKids", default)]
    pub wants_kids: Option<String>,
    #[serde(rename = "zodiacSigns", default)]
    pub zodiac_signs: Vec<String>,
}

impl UserFilters {
    /// Effective age window, falling back to the configured defaults.
    pub fn age_bounds(&self, defaults: MatchingDefaults) -> (u8, u8) {
        (
            self.min_age.unwrap_or(defaults.min_age),
            self.max_age.unwrap_or(defaults.max_age),
        )
    }

    /// Effective distance cutoff in miles.
    pub fn distance_cutoff_miles(&self, defaults: MatchingDefaults) -> f64 {
        self.max_distance_miles
            .unwrap_or(defaults.max_distance_miles)
    }
}

/// Swipe action taken by one user on another. Owned by the swipe
/// subsystem; unique per (actor, target); soft-tombstoned on unmatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(rename = "actorId")]
    pub actor_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
    pub action: ActionKind,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "isUnmatched", default)]
    pub is_unmatched: bool,
    #[serde(rename = "unmatchedAt", default)]
    pub unmatched_at: Option<DateTime<Utc>>,
}

impl ActionRecord {
    pub fn is_like(&self) -> bool {
        matches!(self.action, ActionKind::Like | ActionKind::SuperLike)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Like,
    SuperLike,
    Pass,
}

/// Block between two users. Either direction suppresses visibility both ways.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(rename = "blockerId")]
    pub blocker_id: String,
    #[serde(rename = "blockedId")]
    pub blocked_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Six named sub-scores plus the weighted total, all on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompatibilityBreakdown {
    pub location: f64,
    pub age: f64,
    pub interests: f64,
    pub lifestyle: f64,
    pub verification: f64,
    pub activity: f64,
    pub total: u8,
}

/// One entry of a discovery page. Transient: the engine never persists these.
/// Display fields (photos, bios) are resolved downstream by the presentation
/// mapper in a single batched lookup keyed by candidate id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(rename = "ageYears")]
    pub age_years: Option<u8>,
    pub compatibility: CompatibilityBreakdown,
}

/// Why a discovery call produced zero items, as data rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    ProfileNotFound,
    UserInactive,
    IncompleteProfile,
    NoMatches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Distance,
    #[default]
    Compatibility,
}

/// Weights for the compatibility sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub location: f64,
    pub age: f64,
    pub interests: f64,
    pub lifestyle: f64,
    pub verification: f64,
    pub activity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            location: 0.25,
            age: 0.15,
            interests: 0.20,
            lifestyle: 0.20,
            verification: 0.10,
            activity: 0.10,
        }
    }
}

/// Fallbacks applied when a user has not set the corresponding filter.
#[derive(Debug, Clone, Copy)]
pub struct MatchingDefaults {
    pub min_age: u8,
    pub max_age: u8,
    pub max_distance_miles: f64,
}

impl Default for MatchingDefaults {
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 99,
            max_distance_miles: 100.0,
        }
    }
}
