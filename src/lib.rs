//! Sames Algo - Matching and groups service for the Sames social app
//!
//! This library provides compatibility scoring between user profiles, the
//! like/dislike match lifecycle and topic group membership, behind an
//! actix-web HTTP surface and a pluggable record store.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, Matcher};
pub use error::{AppError, AppResult};
pub use models::{MatchRecord, MatchStatus, Profile, ScoredMatch, ScoringWeights, User};
pub use services::{GroupService, MatchService, MemoryStore, PgStore, ProfileService, RecordStore};
