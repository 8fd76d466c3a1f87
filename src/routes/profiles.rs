use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::models::{CreateProfileRequest, CreateProfileResponse, ProfileResponse};
use crate::routes::{AppState, AuthUser};
use crate::services::{CacheKey, RecordStore};

/// Configure profile routes
pub fn configure<S: RecordStore>(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(me::<S>))
        .route("/profile", web::post().to(create_profile::<S>))
        .route("/profile", web::get().to(get_profile::<S>));
}

async fn me<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.profiles.me(user.id).await?))
}

/// POST /api/v1/profile
async fn create_profile<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
    req: web::Json<CreateProfileRequest>,
) -> AppResult<HttpResponse> {
    let profile = state.profiles.create_profile(user.id, req.into_inner()).await?;

    // A new profile may belong in anyone's discovery results
    if let Some(cache) = &state.cache {
        if let Err(e) = cache.invalidate_pattern(CacheKey::DISCOVER_PATTERN).await {
            tracing::warn!("Failed to invalidate cache: {}", e);
        }
    }

    Ok(HttpResponse::Created().json(CreateProfileResponse {
        message: "Profile created successfully".to_string(),
        profile,
    }))
}

async fn get_profile<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
) -> AppResult<HttpResponse> {
    let profile = state.profiles.get_profile(user.id).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse { profile }))
}
