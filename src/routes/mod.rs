// Route exports
pub mod auth;
pub mod groups;
pub mod matches;
pub mod profiles;

use std::sync::Arc;

use actix_web::{error, web, HttpRequest};

use crate::core::Matcher;
use crate::error::AppError;
use crate::services::{CacheManager, GroupService, MatchService, ProfileService, RecordStore};

pub use auth::AuthUser;

/// Application state shared across all handlers
pub struct AppState<S: RecordStore> {
    pub store: Arc<S>,
    pub matches: Arc<MatchService<S>>,
    pub groups: Arc<GroupService<S>>,
    pub profiles: Arc<ProfileService<S>>,
    pub cache: Option<Arc<CacheManager>>,
}

impl<S: RecordStore> AppState<S> {
    pub fn new(store: Arc<S>, matcher: Matcher, cache: Option<Arc<CacheManager>>) -> Self {
        Self {
            matches: Arc::new(MatchService::new(store.clone(), matcher)),
            groups: Arc::new(GroupService::new(store.clone())),
            profiles: Arc::new(ProfileService::new(store.clone())),
            store,
            cache,
        }
    }
}

// Derived Clone would require S: Clone
impl<S: RecordStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            matches: self.matches.clone(),
            groups: self.groups.clone(),
            profiles: self.profiles.clone(),
            cache: self.cache.clone(),
        }
    }
}

pub fn configure_routes<S: RecordStore>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure::<S>)
            .configure(profiles::configure::<S>)
            .configure(groups::configure::<S>),
    );
}

/// Render malformed JSON bodies through the standard error shape
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    AppError::Validation(format!("Invalid JSON: {}", err)).into()
}

pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid query: {}", err)).into()
}

/// Malformed ids in the path
pub fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid path: {}", err)).into()
}
