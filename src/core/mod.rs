// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use filters::{is_candidate, is_discoverable, matches_group_search};
pub use matcher::{MatchResult, Matcher};
pub use scoring::{age_bonus, calculate_match_score, jaccard_similarity, location_bonus, score_profiles};
