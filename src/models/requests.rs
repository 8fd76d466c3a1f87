use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::default_true;

/// Request to create the caller's profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(range(min = 0, max = 150))]
    #[serde(default)]
    pub age: Option<i32>,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(alias = "personality_traits", rename = "personalityTraits", default)]
    pub personality_traits: Vec<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub fears: Vec<String>,
    #[serde(default)]
    pub habits: Vec<String>,
    #[serde(alias = "is_private", rename = "isPrivate", default)]
    pub is_private: bool,
    #[serde(alias = "allow_matching", rename = "allowMatching", default = "default_true")]
    pub allow_matching: bool,
}

/// Request to create a group
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "is_premium", rename = "isPremium", default)]
    pub is_premium: bool,
}

/// Query string for group discovery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}
