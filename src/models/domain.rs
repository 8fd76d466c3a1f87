use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account record owned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

/// Matching profile, at most one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub age: Option<i32>,
    pub location: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub personality_traits: Vec<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub fears: Vec<String>,
    #[serde(default)]
    pub habits: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default = "default_true")]
    pub allow_matching: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Empty, public, matchable profile for a user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            age: None,
            location: None,
            bio: String::new(),
            personality_traits: vec![],
            likes: vec![],
            dislikes: vec![],
            fears: vec![],
            habits: vec![],
            is_private: false,
            allow_matching: true,
            created_at: Utc::now(),
        }
    }

    /// Returns the list backing a commonality field
    pub fn commonality(&self, field: CommonalityField) -> &[String] {
        match field {
            CommonalityField::PersonalityTraits => &self.personality_traits,
            CommonalityField::Likes => &self.likes,
            CommonalityField::Dislikes => &self.dislikes,
            CommonalityField::Fears => &self.fears,
            CommonalityField::Habits => &self.habits,
        }
    }

    pub fn commonalities(&self) -> Commonalities {
        Commonalities {
            traits: self.personality_traits.clone(),
            likes: self.likes.clone(),
            dislikes: self.dislikes.clone(),
            fears: self.fears.clone(),
            habits: self.habits.clone(),
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}

/// The five categorized attribute lists compared during scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonalityField {
    PersonalityTraits,
    Likes,
    Dislikes,
    Fears,
    Habits,
}

impl CommonalityField {
    pub const ALL: [CommonalityField; 5] = [
        CommonalityField::PersonalityTraits,
        CommonalityField::Likes,
        CommonalityField::Dislikes,
        CommonalityField::Fears,
        CommonalityField::Habits,
    ];
}

/// Commonality lists as exposed to other users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commonalities {
    pub traits: Vec<String>,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub fears: Vec<String>,
    pub habits: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

impl MatchStatus {
    /// Accepted and rejected records never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Accepted | MatchStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        matches!((self, next), (MatchStatus::Pending, MatchStatus::Accepted))
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "pending"),
            MatchStatus::Accepted => write!(f, "accepted"),
            MatchStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Directional like/dislike between two users
///
/// At most one record exists per unordered pair of users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub initiator_id: Uuid,
    pub target_id: Uuid,
    pub match_score: f64,
    pub status: MatchStatus,
    pub matched_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn pending(initiator_id: Uuid, target_id: Uuid, match_score: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            initiator_id,
            target_id,
            match_score,
            status: MatchStatus::Pending,
            matched_at: Utc::now(),
        }
    }

    pub fn rejected(initiator_id: Uuid, target_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            initiator_id,
            target_id,
            match_score: 0.0,
            status: MatchStatus::Rejected,
            matched_at: Utc::now(),
        }
    }

    /// Promote a pending record to accepted
    ///
    /// Fails with the current status when the record is already terminal.
    pub fn accept(&mut self) -> Result<(), MatchStatus> {
        if !self.status.can_transition_to(MatchStatus::Accepted) {
            return Err(self.status);
        }
        self.status = MatchStatus::Accepted;
        Ok(())
    }

    /// Whether the record connects `a` and `b`, in either direction
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.initiator_id == a && self.target_id == b)
            || (self.initiator_id == b && self.target_id == a)
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.initiator_id == user_id || self.target_id == user_id
    }

    /// The other side of the record from `user_id`'s point of view
    pub fn counterparty(&self, user_id: Uuid) -> Uuid {
        if self.initiator_id == user_id {
            self.target_id
        } else {
            self.initiator_id
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
    pub is_premium_group: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Admin,
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

impl GroupMembership {
    pub fn new(group_id: Uuid, user_id: Uuid, role: GroupRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }
}

/// Candidate surfaced by discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub bio: String,
    pub match_score: f64,
    pub commonalities: Commonalities,
    pub mutual_friends: usize,
}

/// Per-field weights for commonality scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub personality_traits: f64,
    pub likes: f64,
    pub dislikes: f64,
    pub fears: f64,
    pub habits: f64,
}

impl ScoringWeights {
    pub fn weight(&self, field: CommonalityField) -> f64 {
        match field {
            CommonalityField::PersonalityTraits => self.personality_traits,
            CommonalityField::Likes => self.likes,
            CommonalityField::Dislikes => self.dislikes,
            CommonalityField::Fears => self.fears,
            CommonalityField::Habits => self.habits,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            personality_traits: 0.25,
            likes: 0.25,
            dislikes: 0.20,
            fears: 0.15,
            habits: 0.15,
        }
    }
}
