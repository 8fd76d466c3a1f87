use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{Group, GroupRole, Profile, ScoredMatch, User};

/// Response for the discovery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub matches: Vec<ScoredMatch>,
}

/// Outcome of a like
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub message: String,
    pub is_mutual: bool,
    pub match_score: f64,
}

/// Generic acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Public fields of the other side of a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCounterparty {
    pub id: Uuid,
    pub username: String,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub bio: String,
}

impl MatchCounterparty {
    pub fn new(user: &User, profile: &Profile) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            age: profile.age,
            location: profile.location.clone(),
            bio: profile.bio.clone(),
        }
    }
}

/// Confirmed mutual match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedMatch {
    pub match_id: Uuid,
    pub user: MatchCounterparty,
    pub match_score: f64,
    pub matched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    pub matches: Vec<AcceptedMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_premium_group: bool,
    pub member_count: usize,
}

impl GroupSummary {
    pub fn new(group: &Group, member_count: usize) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            created_by: group.created_by,
            created_at: group.created_at,
            is_premium_group: group.is_premium_group,
            member_count,
        }
    }
}

/// A group the caller belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyGroup {
    #[serde(flatten)]
    pub group: GroupSummary,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMemberView {
    pub id: Uuid,
    pub username: String,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: GroupSummary,
    pub is_member: bool,
    pub user_role: Option<GroupRole>,
    pub members: Vec<GroupMemberView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsResponse<T> {
    pub groups: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse<T> {
    pub group: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupResponse {
    pub message: String,
    pub group: GroupSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileResponse {
    pub message: String,
    pub profile: Profile,
}

/// Current user summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "hasCompletedProfile")]
    pub has_completed_profile: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
