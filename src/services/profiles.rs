use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{CreateProfileRequest, MeResponse, Profile};
use crate::services::store::{RecordStore, StoreTx};

/// Profile creation and lookup
pub struct ProfileService<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> ProfileService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create the one profile `user_id` may own
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        request: CreateProfileRequest,
    ) -> AppResult<Profile> {
        request.validate()?;

        let mut tx = self.store.begin().await?;

        if tx.get_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        if tx.get_profile(user_id).await?.is_some() {
            return Err(AppError::Conflict("Profile already exists".to_string()));
        }

        let profile = Profile {
            user_id,
            age: request.age,
            location: request
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            bio: request.bio.unwrap_or_default(),
            personality_traits: request.personality_traits,
            likes: request.likes,
            dislikes: request.dislikes,
            fears: request.fears,
            habits: request.habits,
            is_private: request.is_private,
            allow_matching: request.allow_matching,
            created_at: Utc::now(),
        };

        tx.insert_profile(&profile).await?;
        tx.commit().await?;

        tracing::info!("Created profile for user {}", user_id);

        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let mut tx = self.store.begin().await?;
        let profile = tx.get_profile(user_id).await?;
        tx.commit().await?;

        profile.ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<MeResponse> {
        let mut tx = self.store.begin().await?;

        let user = tx
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let has_completed_profile = tx.get_profile(user_id).await?.is_some();

        tx.commit().await?;

        Ok(MeResponse {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            has_completed_profile,
        })
    }
}
