// Integration tests for the discovery pipeline over in-memory collaborators

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Duration, NaiveDate, Utc};

use ember_discovery::core::{DiscoverRequest, DiscoveryError, DiscoveryOrchestrator};
use ember_discovery::models::{
    ActionKind, ActionRecord, BlockRecord, EmptyReason, MatchingDefaults, ProfileAttributes,
    ProfileRecord, ScoringWeights, SortMode, UserFilters,
};
use ember_discovery::services::{
    ActionRepository, BlockRepository, GatewayError, ProfileRepository, UserFiltersRepository,
};

#[derive(Default)]
struct InMemoryBackend {
    profiles: Vec<ProfileRecord>,
    actions: Vec<ActionRecord>,
    blocks: Vec<BlockRecord>,
    filters: HashMap<String, UserFilters>,
    blocks_unavailable: bool,
    candidate_load_delay: Option<std::time::Duration>,
}

#[derive(Clone)]
struct SharedBackend(Arc<InMemoryBackend>);

impl ProfileRepository for SharedBackend {
    async fn load_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, GatewayError> {
        Ok(self
            .0
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn load_eligible_candidates(
        &self,
        exclude_ids: &[String],
    ) -> Result<Vec<ProfileRecord>, GatewayError> {
        if let Some(delay) = self.0.candidate_load_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .0
            .profiles
            .iter()
            .filter(|p| p.is_eligible() && !exclude_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }
}

impl ActionRepository for SharedBackend {
    async fn load_actions_from(&self, user_id: &str) -> Result<Vec<ActionRecord>, GatewayError> {
        Ok(self
            .0
            .actions
            .iter()
            .filter(|a| a.actor_id == user_id)
            .cloned()
            .collect())
    }

    async fn load_actions_to(&self, user_id: &str) -> Result<Vec<ActionRecord>, GatewayError> {
        Ok(self
            .0
            .actions
            .iter()
            .filter(|a| a.target_id == user_id)
            .cloned()
            .collect())
    }
}

impl BlockRepository for SharedBackend {
    async fn load_blocks_involving(
        &self,
        user_id: &str,
    ) -> Result<Vec<BlockRecord>, GatewayError> {
        if self.0.blocks_unavailable {
            return Err(GatewayError::ApiError("blocks service unreachable".into()));
        }
        Ok(self
            .0
            .blocks
            .iter()
            .filter(|b| b.blocker_id == user_id || b.blocked_id == user_id)
            .cloned()
            .collect())
    }
}

impl UserFiltersRepository for SharedBackend {
    async fn load(&self, user_id: &str) -> Result<Option<UserFilters>, GatewayError> {
        Ok(self.0.filters.get(user_id).cloned())
    }
}

type TestEngine =
    DiscoveryOrchestrator<SharedBackend, SharedBackend, SharedBackend, SharedBackend>;

fn engine(backend: InMemoryBackend) -> TestEngine {
    let backend = SharedBackend(Arc::new(backend));
    DiscoveryOrchestrator::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend,
        MatchingDefaults::default(),
        ScoringWeights::default(),
    )
}

fn dob_for_age(age: i32) -> Option<NaiveDate> {
    // January 1st of the right year keeps the age exact regardless of the
    // test run date.
    NaiveDate::from_ymd_opt(Utc::now().year() - age, 1, 1)
}

fn profile(
    user_id: &str,
    gender: &str,
    looking_for: &[&str],
    age: i32,
    lat: f64,
    lon: f64,
) -> ProfileRecord {
    ProfileRecord {
        id: format!("profile_{}", user_id),
        user_id: user_id.to_string(),
        gender: gender.to_string(),
        looking_for: looking_for.iter().map(|s| s.to_string()).collect(),
        date_of_birth: dob_for_age(age),
        latitude: Some(lat),
        longitude: Some(lon),
        attributes: ProfileAttributes::default(),
        is_verified: true,
        last_active_at: Some(Utc::now()),
        can_start_matching: true,
        profile_hidden: false,
        suspended: false,
    }
}

fn like(actor: &str, target: &str) -> ActionRecord {
    ActionRecord {
        actor_id: actor.to_string(),
        target_id: target.to_string(),
        action: ActionKind::Like,
        created_at: Utc::now(),
        is_unmatched: false,
        unmatched_at: None,
    }
}

fn returned_ids(items: &[ember_discovery::models::ScoredCandidate]) -> Vec<&str> {
    items.iter().map(|c| c.candidate_id.as_str()).collect()
}

#[tokio::test]
async fn test_scenario_a_age_window() {
    // Requester female, looking for male, 25-35 window; pool of three males
    // at identical coordinates aged 20, 30 and 40. Only the 30-year-old
    // survives.
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("requester", "female", &["male"], 30, 40.0, -73.0),
        profile("young", "male", &["female"], 20, 40.0, -73.0),
        profile("mid", "male", &["female"], 30, 40.0, -73.0),
        profile("old", "male", &["female"], 40, 40.0, -73.0),
    ];
    backend.filters.insert(
        "requester".to_string(),
        UserFilters {
            min_age: Some(25),
            max_age: Some(35),
            ..Default::default()
        },
    );

    let page = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap();

    assert_eq!(page.empty_reason, None);
    assert_eq!(returned_ids(&page.items), vec!["mid"]);
    assert_eq!(page.items[0].age_years, Some(30));
}

#[tokio::test]
async fn test_scenario_b_mutual_likes_never_resurface() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("alice", "female", &["male"], 30, 40.0, -73.0),
        profile("bob", "male", &["female"], 30, 40.0, -73.0),
        profile("carl", "male", &["female"], 30, 40.0, -73.0),
    ];
    backend.actions = vec![like("alice", "bob"), like("bob", "alice")];
    let engine = engine(backend);

    let for_alice = engine
        .discover(&DiscoverRequest::new("alice"))
        .await
        .unwrap();
    assert_eq!(returned_ids(&for_alice.items), vec!["carl"]);

    let for_bob = engine.discover(&DiscoverRequest::new("bob")).await.unwrap();
    assert!(!returned_ids(&for_bob.items).contains(&"alice"));
}

#[tokio::test]
async fn test_scenario_c_empty_looking_for_is_incomplete_profile() {
    let mut backend = InMemoryBackend::default();
    let mut requester = profile("requester", "female", &[], 30, 40.0, -73.0);
    requester.looking_for.clear();
    backend.profiles = vec![
        requester,
        profile("a", "male", &["female"], 30, 40.0, -73.0),
        profile("b", "male", &["female"], 30, 40.0, -73.0),
    ];

    let page = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap();

    assert_eq!(page.empty_reason, Some(EmptyReason::IncompleteProfile));
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_blocks_exclude_both_directions() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("alice", "female", &["male"], 30, 40.0, -73.0),
        profile("bob", "male", &["female"], 30, 40.0, -73.0),
    ];
    backend.blocks = vec![BlockRecord {
        blocker_id: "alice".to_string(),
        blocked_id: "bob".to_string(),
        created_at: Utc::now(),
    }];
    let engine = engine(backend);

    let for_alice = engine
        .discover(&DiscoverRequest::new("alice"))
        .await
        .unwrap();
    assert_eq!(for_alice.empty_reason, Some(EmptyReason::NoMatches));

    let for_bob = engine.discover(&DiscoverRequest::new("bob")).await.unwrap();
    assert_eq!(for_bob.empty_reason, Some(EmptyReason::NoMatches));
}

#[tokio::test]
async fn test_profile_not_found() {
    let page = engine(InMemoryBackend::default())
        .discover(&DiscoverRequest::new("ghost"))
        .await
        .unwrap();

    assert_eq!(page.empty_reason, Some(EmptyReason::ProfileNotFound));
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_suspended_requester_is_inactive() {
    let mut backend = InMemoryBackend::default();
    let mut requester = profile("requester", "female", &["male"], 30, 40.0, -73.0);
    requester.suspended = true;
    backend.profiles = vec![requester];

    let page = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap();

    assert_eq!(page.empty_reason, Some(EmptyReason::UserInactive));
}

#[tokio::test]
async fn test_empty_pool_is_no_matches_not_an_error() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("requester", "female", &["male"], 30, 40.0, -73.0),
        // Wrong direction: looking for men.
        profile("a", "male", &["male"], 30, 40.0, -73.0),
    ];

    let page = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap();

    assert_eq!(page.empty_reason, Some(EmptyReason::NoMatches));
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_bidirectional_invariant_over_mixed_pool() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("requester", "female", &["male", "nonbinary"], 30, 40.0, -73.0),
        profile("m1", "male", &["female"], 30, 40.0, -73.0),
        profile("m2", "male", &["male"], 30, 40.0, -73.0), // does not accept female
        profile("nb1", "nonbinary", &["female"], 30, 40.0, -73.0),
        profile("f1", "female", &["female"], 30, 40.0, -73.0), // gender not sought
    ];
    let requester = backend.profiles[0].clone();
    let by_id: HashMap<String, ProfileRecord> = backend
        .profiles
        .iter()
        .map(|p| (p.user_id.clone(), p.clone()))
        .collect();

    let page = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap();

    let ids = returned_ids(&page.items);
    assert_eq!(ids.len(), 2);
    for id in ids {
        let candidate = &by_id[id];
        assert!(requester.looking_for.contains(&candidate.gender));
        assert!(candidate.looking_for.contains(&requester.gender));
    }
}

#[tokio::test]
async fn test_determinism_across_repeated_calls() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![profile("requester", "female", &["male"], 30, 40.0, -73.0)];
    for i in 0..25 {
        let mut candidate = profile(
            &format!("c{:02}", i),
            "male",
            &["female"],
            26 + (i % 10) as i32,
            40.0 + i as f64 * 0.01,
            -73.0,
        );
        // Identical totals for several candidates force the tie-breaks.
        candidate.last_active_at = Some(Utc::now() - Duration::days((i % 5) as i64));
        backend.profiles.push(candidate);
    }
    let engine = engine(backend);
    let request = DiscoverRequest::new("requester");

    let first = engine.discover(&request).await.unwrap();
    let second = engine.discover(&request).await.unwrap();

    assert_eq!(returned_ids(&first.items), returned_ids(&second.items));
    assert_eq!(first.total, second.total);
}

#[tokio::test]
async fn test_pagination_slices_after_sorting() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![profile("requester", "female", &["male"], 30, 40.0, -73.0)];
    for i in 0..10 {
        backend.profiles.push(profile(
            &format!("c{}", i),
            "male",
            &["female"],
            30,
            40.0,
            -73.0,
        ));
    }
    let engine = engine(backend);

    let mut request = DiscoverRequest::new("requester");
    request.limit = 4;
    let first_page = engine.discover(&request).await.unwrap();
    request.offset = 4;
    let second_page = engine.discover(&request).await.unwrap();

    assert_eq!(first_page.total, 10);
    assert_eq!(second_page.total, 10);
    assert_eq!(first_page.items.len(), 4);
    assert_eq!(second_page.items.len(), 4);

    let first_ids = returned_ids(&first_page.items);
    let second_ids = returned_ids(&second_page.items);
    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
}

#[tokio::test]
async fn test_distance_sort_mode_nearest_first_unknown_last() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("requester", "female", &["male"], 30, 40.0, -73.0),
        profile("far", "male", &["female"], 30, 40.8, -73.0),
        profile("near", "male", &["female"], 30, 40.1, -73.0),
    ];
    let mut unknown = profile("unknown", "male", &["female"], 30, 0.0, 0.0);
    unknown.latitude = None;
    unknown.longitude = None;
    backend.profiles.push(unknown);

    let mut request = DiscoverRequest::new("requester");
    request.sort = SortMode::Distance;
    let page = engine(backend).discover(&request).await.unwrap();

    assert_eq!(returned_ids(&page.items), vec!["near", "far", "unknown"]);
    assert_eq!(page.items[2].distance_km, None);
}

#[tokio::test]
async fn test_invalid_limit_rejected_before_any_work() {
    let engine = engine(InMemoryBackend::default());

    let mut request = DiscoverRequest::new("requester");
    request.limit = 101;
    let err = engine.discover(&request).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidRequest(_)));

    request.limit = 0;
    let err = engine.discover(&request).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_collaborator_failure_fails_whole_call() {
    // A missing block read must fail the call, never degrade to partial
    // exclusions.
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("requester", "female", &["male"], 30, 40.0, -73.0),
        profile("bob", "male", &["female"], 30, 40.0, -73.0),
    ];
    backend.blocks_unavailable = true;

    let err = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap_err();

    assert!(matches!(err, DiscoveryError::Upstream(_)));
}

#[tokio::test]
async fn test_deadline_expiry_is_typed_and_prompt() {
    // A collaborator stuck well past the caller's budget must produce a
    // typed deadline failure quickly, not wait out the slow read.
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("requester", "female", &["male"], 30, 40.0, -73.0),
        profile("bob", "male", &["female"], 30, 40.0, -73.0),
    ];
    backend.candidate_load_delay = Some(std::time::Duration::from_secs(5));

    let mut request = DiscoverRequest::new("requester");
    request.deadline = Some(std::time::Duration::from_millis(50));

    let started = Instant::now();
    let err = engine(backend).discover(&request).await.unwrap_err();

    assert!(matches!(err, DiscoveryError::DeadlineExceeded));
    assert!(
        started.elapsed() < std::time::Duration::from_secs(1),
        "deadline failure must not wait for the slow collaborator"
    );
}

#[tokio::test]
async fn test_no_deadline_waits_for_slow_collaborator() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("requester", "female", &["male"], 30, 40.0, -73.0),
        profile("bob", "male", &["female"], 30, 40.0, -73.0),
    ];
    backend.candidate_load_delay = Some(std::time::Duration::from_millis(100));

    let page = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap();

    assert_eq!(returned_ids(&page.items), vec!["bob"]);
}

#[tokio::test]
async fn test_passed_candidates_do_not_return() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![
        profile("requester", "female", &["male"], 30, 40.0, -73.0),
        profile("passed", "male", &["female"], 30, 40.0, -73.0),
        profile("fresh", "male", &["female"], 30, 40.0, -73.0),
    ];
    backend.actions = vec![ActionRecord {
        actor_id: "requester".to_string(),
        target_id: "passed".to_string(),
        action: ActionKind::Pass,
        created_at: Utc::now(),
        is_unmatched: false,
        unmatched_at: None,
    }];

    let page = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap();

    assert_eq!(returned_ids(&page.items), vec!["fresh"]);
}

#[tokio::test]
async fn test_compatibility_sort_prefers_verified_and_active() {
    let mut backend = InMemoryBackend::default();
    backend.profiles = vec![profile("requester", "female", &["male"], 30, 40.0, -73.0)];

    let mut strong = profile("strong", "male", &["female"], 30, 40.0, -73.0);
    strong.is_verified = true;
    strong.last_active_at = Some(Utc::now());

    let mut weak = profile("weak", "male", &["female"], 30, 40.0, -73.0);
    weak.is_verified = false;
    weak.last_active_at = Some(Utc::now() - Duration::days(120));

    backend.profiles.push(weak);
    backend.profiles.push(strong);

    let page = engine(backend)
        .discover(&DiscoverRequest::new("requester"))
        .await
        .unwrap();

    assert_eq!(returned_ids(&page.items), vec!["strong", "weak"]);
    assert!(page.items[0].compatibility.total > page.items[1].compatibility.total);
}
