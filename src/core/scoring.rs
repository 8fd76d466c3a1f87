use std::collections::HashSet;

use crate::models::{CommonalityField, Profile, ScoringWeights};

/// Weight accrued by the age bonus whenever both ages are known
pub const AGE_BONUS_WEIGHT: f64 = 0.1;

/// Weight accrued by the location bonus whenever both locations are known
pub const LOCATION_BONUS_WEIGHT: f64 = 0.1;

/// Calculate a compatibility score (0-100) between two profiles
///
/// Scoring formula:
/// ```text
/// for each commonality field where both lists are non-empty:
///     score  += jaccard(a, b) * weight * 100
///     total  += weight
/// if both ages are known:       score += age_bonus(|a - b|);  total += 0.1
/// if both locations are known:  score += location_bonus(a, b); total += 0.1
///
/// final = min(100, score / total * 100), rounded to 2 decimals (0 when total == 0)
/// ```
///
/// The normalization divides an already percentage-scaled sum by the accrued
/// weight and scales by 100 again. Stored scores depend on this exact arithmetic.
pub fn calculate_match_score(a: &Profile, b: &Profile, weights: &ScoringWeights) -> f64 {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for field in CommonalityField::ALL {
        let list_a = a.commonality(field);
        let list_b = b.commonality(field);

        if list_a.is_empty() || list_b.is_empty() {
            continue;
        }

        let weight = weights.weight(field);
        total_score += jaccard_similarity(list_a, list_b) * weight * 100.0;
        total_weight += weight;
    }

    if let (Some(age_a), Some(age_b)) = (known_age(a), known_age(b)) {
        total_score += age_bonus(age_a.abs_diff(age_b));
        total_weight += AGE_BONUS_WEIGHT;
    }

    if let (Some(loc_a), Some(loc_b)) = (known_location(a), known_location(b)) {
        total_score += location_bonus(loc_a, loc_b);
        // Accrues even when the locations do not match at all
        total_weight += LOCATION_BONUS_WEIGHT;
    }

    if total_weight <= 0.0 {
        return 0.0;
    }

    round2((total_score / total_weight * 100.0).min(100.0))
}

/// Score two possibly-absent profiles; a missing side scores 0
pub fn score_profiles(
    a: Option<&Profile>,
    b: Option<&Profile>,
    weights: &ScoringWeights,
) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => calculate_match_score(a, b, weights),
        _ => 0.0,
    }
}

/// Case-insensitive |A ∩ B| / |A ∪ B|
pub fn jaccard_similarity(a: &[String], b: &[String]) -> f64 {
    let set_a: HashSet<String> = a.iter().map(|s| s.to_lowercase()).collect();
    let set_b: HashSet<String> = b.iter().map(|s| s.to_lowercase()).collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }

    set_a.intersection(&set_b).count() as f64 / union as f64
}

/// Flat bonus for a small absolute age difference
#[inline]
pub fn age_bonus(age_diff: u32) -> f64 {
    match age_diff {
        0..=2 => 10.0,
        3..=5 => 5.0,
        6..=10 => 2.0,
        _ => 0.0,
    }
}

/// Bonus for exact (+10) or token-level (+5) location overlap
///
/// Token matching is directional: whitespace-separated words of `a` are
/// looked up as substrings of `b`.
pub fn location_bonus(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        10.0
    } else if a.split_whitespace().any(|word| b.contains(word)) {
        5.0
    } else {
        0.0
    }
}

/// Ages of zero are treated as unknown
#[inline]
fn known_age(profile: &Profile) -> Option<i32> {
    profile.age.filter(|age| *age > 0)
}

#[inline]
fn known_location(profile: &Profile) -> Option<&str> {
    profile.location.as_deref().filter(|loc| !loc.is_empty())
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
