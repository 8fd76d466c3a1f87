use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sames_algo::config::{AuthMode, Settings};
use sames_algo::core::Matcher;
use sames_algo::models::ScoringWeights;
use sames_algo::routes::{self, AppState};
use sames_algo::services::{
    CacheManager, IdentityResolver, JwtVerifier, PgStore, RemoteIdentityClient,
};

fn io_error(msg: String) -> std::io::Error {
    std::io::Error::other(msg)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| io_error(format!("Configuration error: {}", e)))?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Sames matching service...");

    // Initialize PostgreSQL store (runs pending migrations)
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let store = PgStore::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        io_error(format!("PostgreSQL connection error: {}", e))
    })?;

    info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);

    // Initialize cache manager (optional - app can work without it)
    let cache = if settings.cache.enabled {
        let cache_ttl = settings.cache.ttl_secs.unwrap_or(60);
        let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

        match CacheManager::new(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!(
                    "Cache manager initialized (L1: {} entries, TTL: {}s, redis: {})",
                    l1_cache_size,
                    cache_ttl,
                    c.stats().redis_enabled
                );
                Some(Arc::new(c))
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), falling back to in-process cache", e);
                Some(Arc::new(CacheManager::local(l1_cache_size, cache_ttl)))
            }
        }
    } else {
        info!("Discovery cache disabled");
        None
    };

    // Identity resolution
    let resolver = match settings.auth.mode {
        AuthMode::Jwt => {
            let secret = settings
                .auth
                .jwt_secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| io_error("auth.jwt_secret is required in jwt mode".to_string()))?;
            IdentityResolver::Jwt(JwtVerifier::new(secret))
        }
        AuthMode::Remote => {
            let url = settings
                .auth
                .remote_url
                .clone()
                .ok_or_else(|| io_error("auth.remote_url is required in remote mode".to_string()))?;
            let timeout = Duration::from_secs(settings.auth.timeout_secs.unwrap_or(5));
            let client = RemoteIdentityClient::new(url, timeout)
                .map_err(|e| io_error(e.to_string()))?;
            IdentityResolver::Remote(client)
        }
    };

    info!("Identity resolution mode: {:?}", settings.auth.mode);

    // Initialize matcher with configured weights
    let weights = ScoringWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(
        weights,
        settings.matching.min_score,
        settings.matching.max_results,
    );

    info!("Matcher initialized with weights: {:?}", weights);

    let app_state = AppState::new(Arc::new(store), matcher, cache);
    let resolver = web::Data::new(resolver);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(resolver.clone())
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(routes::handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<PgStore>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
