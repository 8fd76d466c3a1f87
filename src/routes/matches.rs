use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    DiscoverResponse, HealthResponse, LikeResponse, MatchesResponse, MessageResponse, ScoredMatch,
};
use crate::routes::{AppState, AuthUser};
use crate::services::{CacheKey, RecordStore};

/// Configure health and matching routes
pub fn configure<S: RecordStore>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check::<S>))
        .route("/matching/discover", web::get().to(discover::<S>))
        .route("/matching/like/{target_id}", web::post().to(like::<S>))
        .route("/matching/dislike/{target_id}", web::post().to(dislike::<S>))
        .route("/matching/matches", web::get().to(list_matches::<S>));
}

/// Health check endpoint
async fn health_check<S: RecordStore>(state: web::Data<AppState<S>>) -> HttpResponse {
    let healthy = match state.store.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Ranked match candidates for the caller
///
/// GET /api/v1/matching/discover
async fn discover<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
) -> AppResult<HttpResponse> {
    let cache_key = CacheKey::discover(&user.id);

    if let Some(cache) = &state.cache {
        if let Ok(cached) = cache.get::<Vec<ScoredMatch>>(&cache_key).await {
            tracing::debug!("Serving cached discovery for {}", user.id);
            let matches = state.matches.retain_unevaluated(user.id, cached).await?;
            return Ok(HttpResponse::Ok().json(DiscoverResponse { matches }));
        }
    }

    let matches = state.matches.discover(user.id).await?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set(&cache_key, &matches).await {
            tracing::warn!("Failed to cache discovery for {}: {}", user.id, e);
        }
    }

    Ok(HttpResponse::Ok().json(DiscoverResponse { matches }))
}

/// POST /api/v1/matching/like/{target_id}
async fn like<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let target_id = path.into_inner();
    let outcome = state.matches.like(user.id, target_id).await?;

    invalidate_discovery(&state, &[user.id, target_id]).await;

    let message = if outcome.mutual {
        "It's a match!"
    } else {
        "Like recorded successfully"
    };

    Ok(HttpResponse::Ok().json(LikeResponse {
        message: message.to_string(),
        is_mutual: outcome.mutual,
        match_score: outcome.score,
    }))
}

/// POST /api/v1/matching/dislike/{target_id}
async fn dislike<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let target_id = path.into_inner();

    if state.matches.dislike(user.id, target_id).await? {
        invalidate_discovery(&state, &[user.id, target_id]).await;
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Dislike recorded successfully")))
}

/// GET /api/v1/matching/matches
async fn list_matches<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
) -> AppResult<HttpResponse> {
    let matches = state.matches.list_matches(user.id).await?;
    Ok(HttpResponse::Ok().json(MatchesResponse { matches }))
}

/// Drop cached discovery results for users whose candidate set changed
async fn invalidate_discovery<S: RecordStore>(state: &AppState<S>, users: &[Uuid]) {
    let Some(cache) = &state.cache else {
        return;
    };

    for user_id in users {
        if let Err(e) = cache.delete(&CacheKey::discover(user_id)).await {
            tracing::warn!("Failed to invalidate cache: {}", e);
        }
    }
}
