use std::collections::HashSet;

use uuid::Uuid;

use crate::core::{filters::is_candidate, scoring::calculate_match_score};
use crate::models::{Profile, ScoredMatch, ScoringWeights, User};

/// Default minimum score a candidate must exceed to be surfaced
pub const DEFAULT_MIN_SCORE: f64 = 50.0;

/// Default number of candidates returned by discovery
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Result of the ranking process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
}

/// Discovery ranking - filters, scores and orders candidate profiles
///
/// # Pipeline Stages
/// 1. Eligibility (not self, discoverable, not already evaluated)
/// 2. Scoring against the requester's profile
/// 3. Threshold (strictly greater than `min_score`)
/// 4. Ordering and truncation
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    min_score: f64,
    max_results: usize,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, min_score: f64, max_results: usize) -> Self {
        Self {
            weights,
            min_score,
            max_results,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), DEFAULT_MIN_SCORE, DEFAULT_MAX_RESULTS)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score two profiles with this matcher's weights
    pub fn score(&self, a: &Profile, b: &Profile) -> f64 {
        calculate_match_score(a, b, &self.weights)
    }

    /// Rank candidates for the owner of `requester`
    ///
    /// # Arguments
    /// * `requester` - The requesting user's profile
    /// * `candidates` - Users with their profiles
    /// * `evaluated` - Users already sharing a match record with the requester
    ///
    /// # Returns
    /// MatchResult with at most `max_results` matches, best first.
    /// `mutual_friends` is left at zero for the caller to fill in.
    pub fn rank(
        &self,
        requester: &Profile,
        candidates: Vec<(User, Profile)>,
        evaluated: &HashSet<Uuid>,
    ) -> MatchResult {
        let total_candidates = candidates.len();

        let mut scored_matches: Vec<ScoredMatch> = candidates
            .into_iter()
            .filter(|(_, profile)| is_candidate(requester.user_id, profile, evaluated))
            .filter_map(|(user, profile)| {
                let score = self.score(requester, &profile);

                if score > self.min_score {
                    Some(ScoredMatch {
                        id: user.id,
                        name: user.username,
                        age: profile.age,
                        location: profile.location.clone(),
                        bio: profile.bio.clone(),
                        match_score: score,
                        commonalities: profile.commonalities(),
                        mutual_friends: 0,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Sort by score (descending), then name and id so equal scores stay stable
        scored_matches.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });

        scored_matches.truncate(self.max_results);

        MatchResult {
            matches: scored_matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
