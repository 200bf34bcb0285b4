use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::core::distance::{distance_km_between, km_to_miles};
use crate::models::{MatchingDefaults, ProfileRecord, UserFilters};

/// A candidate that survived filtering, annotated with the values the
/// filter pass already had to compute.
#[derive(Debug, Clone)]
pub struct FilteredCandidate {
    pub profile: ProfileRecord,
    pub age_years: Option<u8>,
    pub distance_km: Option<f64>,
}

/// Applies bidirectional preference rules, attribute filters and the
/// distance cutoff to a candidate pool.
#[derive(Debug, Clone, Copy)]
pub struct FilterEngine {
    defaults: MatchingDefaults,
}

impl FilterEngine {
    pub fn new(defaults: MatchingDefaults) -> Self {
        Self { defaults }
    }

    /// Run the filter pipeline over `pool`, preserving input order.
    ///
    /// `today` is injected so age derivation stays deterministic in tests.
    pub fn apply(
        &self,
        requester: &ProfileRecord,
        filters: &UserFilters,
        excluded: &HashSet<String>,
        pool: Vec<ProfileRecord>,
        today: NaiveDate,
    ) -> Vec<FilteredCandidate> {
        let (min_age, max_age) = filters.age_bounds(self.defaults);
        let cutoff_miles = filters.distance_cutoff_miles(self.defaults);
        let requester_coords = requester.coordinates();

        pool.into_iter()
            .filter(|candidate| !excluded.contains(&candidate.user_id))
            // The repository pre-applies eligibility flags; re-check anyway
            // since an ineligible profile leaking through is a hard invariant
            // violation.
            .filter(|candidate| candidate.is_eligible())
            .filter(|candidate| mutual_gender_match(requester, candidate))
            .filter_map(|candidate| {
                let age_years = candidate
                    .date_of_birth
                    .map(|dob| age_in_years(dob, today));

                // Unknown age is retained, not treated as out of range.
                if let Some(age) = age_years {
                    if age < min_age || age > max_age {
                        return None;
                    }
                }

                if !passes_attribute_filters(&candidate, filters) {
                    return None;
                }

                let distance_km = distance_km_between(requester_coords, candidate.coordinates());

                // Known distance beyond the cutoff excludes; unknown distance
                // is retained as distance-neutral rather than
                // distance-violating. A zero cutoff excludes every candidate
                // whose distance is known at all.
                if let Some(km) = distance_km {
                    if cutoff_miles <= 0.0 || km_to_miles(km) > cutoff_miles {
                        return None;
                    }
                }

                Some(FilteredCandidate {
                    profile: candidate,
                    age_years,
                    distance_km,
                })
            })
            .collect()
    }
}

/// Mutual acceptance: each party's looking_for must include the other's
/// gender. An empty looking_for on either side fails closed.
#[inline]
pub fn mutual_gender_match(requester: &ProfileRecord, candidate: &ProfileRecord) -> bool {
    if requester.looking_for.is_empty() || candidate.looking_for.is_empty() {
        return false;
    }

    contains_ignore_case(&candidate.looking_for, &requester.gender)
        && contains_ignore_case(&requester.looking_for, &candidate.gender)
}

/// Calendar-correct age: the year difference, decremented if the birthday
/// has not yet occurred this year.
#[inline]
pub fn age_in_years(dob: NaiveDate, today: NaiveDate) -> u8 {
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years.clamp(0, u8::MAX as i32) as u8
}

/// Optional attribute filters: an unset dimension imposes no constraint; a
/// set dimension requires an exact (case-insensitive) match for scalars or
/// membership for array filters.
pub fn passes_attribute_filters(candidate: &ProfileRecord, filters: &UserFilters) -> bool {
    let attrs = &candidate.attributes;

    scalar_in_list(&filters.body_types, attrs.body_type.as_deref())
        && scalar_in_list(&filters.ethnicities, attrs.ethnicity.as_deref())
        && scalar_in_list(&filters.religions, attrs.religion.as_deref())
        && scalar_in_list(&filters.education_levels, attrs.education.as_deref())
        && scalar_in_list(&filters.zodiac_signs, attrs.zodiac_sign.as_deref())
        && scalar_equals(filters.smoking.as_deref(), attrs.smoking.as_deref())
        && scalar_equals(filters.drinking.as_deref(), attrs.drinking.as_deref())
        && scalar_equals(filters.marijuana.as_deref(), attrs.marijuana.as_deref())
        && scalar_equals(filters.has_kids.as_deref(), attrs.has_kids.as_deref())
        && scalar_equals(filters.wants_kids.as_deref(), attrs.wants_kids.as_deref())
}

#[inline]
fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

/// Empty filter list means unconstrained; a set list requires the candidate
/// attribute to be present and a member.
#[inline]
fn scalar_in_list(filter: &[String], value: Option<&str>) -> bool {
    if filter.is_empty() {
        return true;
    }
    match value {
        Some(v) => contains_ignore_case(filter, v),
        None => false,
    }
}

#[inline]
fn scalar_equals(filter: Option<&str>, value: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(wanted) => match value {
            Some(v) => wanted.eq_ignore_ascii_case(v),
            None => false,
        },
    }
}
