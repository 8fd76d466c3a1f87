// Integration tests for Sames Algo

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use sames_algo::core::Matcher;
use sames_algo::models::{CreateProfileRequest, GroupRole, MatchStatus};
use sames_algo::routes::{self, AppState};
use sames_algo::services::{
    CacheManager, Claims, GroupService, IdentityResolver, JwtVerifier, MatchService, MemoryStore,
    ProfileService, RecordStore, StoreTx,
};
use sames_algo::AppError;

const SECRET: &str = "integration-secret";

fn profile_request(likes: &[&str], location: Option<&str>) -> CreateProfileRequest {
    CreateProfileRequest {
        age: Some(27),
        location: location.map(str::to_string),
        likes: likes.iter().map(|s| s.to_string()).collect(),
        personality_traits: vec!["Creative".to_string()],
        allow_matching: true,
        ..Default::default()
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    matches: MatchService<MemoryStore>,
    groups: GroupService<MemoryStore>,
    profiles: ProfileService<MemoryStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    fn with_store(store: Arc<MemoryStore>) -> Self {
        Self {
            matches: MatchService::new(store.clone(), Matcher::with_default_weights()),
            groups: GroupService::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            store,
        }
    }

    async fn user_with_profile(&self, name: &str, likes: &[&str]) -> Uuid {
        let user = self.store.add_user(name).await.unwrap();
        self.profiles
            .create_profile(user.id, profile_request(likes, Some("San Francisco")))
            .await
            .unwrap();
        user.id
    }
}

#[tokio::test]
async fn test_mutual_match_lifecycle() {
    let h = Harness::new();
    let alex = h.user_with_profile("alex_k", &["Coffee", "Art"]).await;
    let sarah = h.user_with_profile("sarah_m", &["coffee", "art"]).await;

    let discovered = h.matches.discover(alex).await.unwrap();
    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].id, sarah);

    let first = h.matches.like(alex, sarah).await.unwrap();
    assert!(!first.mutual);
    assert!(h.matches.list_matches(alex).await.unwrap().is_empty());

    let second = h.matches.like(sarah, alex).await.unwrap();
    assert!(second.mutual);

    let alex_matches = h.matches.list_matches(alex).await.unwrap();
    let sarah_matches = h.matches.list_matches(sarah).await.unwrap();
    assert_eq!(alex_matches.len(), 1);
    assert_eq!(sarah_matches.len(), 1);
    assert_eq!(alex_matches[0].user.id, sarah);
    assert_eq!(sarah_matches[0].user.username, "alex_k");
    assert_eq!(alex_matches[0].match_id, sarah_matches[0].match_id);

    // One record for the pair, now accepted
    assert_eq!(h.store.match_count().await, 1);
    let mut tx = h.store.begin().await.unwrap();
    let record = tx.find_match_between(alex, sarah).await.unwrap().unwrap();
    assert_eq!(record.status, MatchStatus::Accepted);
}

#[tokio::test]
async fn test_evaluated_users_leave_discovery() {
    let h = Harness::new();
    let alex = h.user_with_profile("alex_k", &["Coffee"]).await;
    let liked = h.user_with_profile("liked", &["Coffee"]).await;
    let disliked = h.user_with_profile("disliked", &["Coffee"]).await;
    let fresh = h.user_with_profile("fresh", &["Coffee"]).await;

    assert_eq!(h.matches.discover(alex).await.unwrap().len(), 3);

    assert_ok!(h.matches.like(alex, liked).await);
    assert_ok!(h.matches.dislike(alex, disliked).await);

    let remaining: Vec<Uuid> = h
        .matches
        .discover(alex)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(remaining, vec![fresh]);

    // The disliked user no longer sees the requester either
    let theirs: Vec<Uuid> = h
        .matches
        .discover(disliked)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert!(!theirs.contains(&alex));
}

#[tokio::test]
async fn test_matched_users_leave_each_others_discovery() {
    let h = Harness::new();
    let alex = h.user_with_profile("alex_k", &["Coffee", "Art"]).await;
    let sarah = h.user_with_profile("sarah_m", &["coffee", "art"]).await;
    let fresh = h.user_with_profile("fresh", &["Coffee", "Art"]).await;

    assert_ok!(h.matches.like(alex, sarah).await);
    assert!(h.matches.like(sarah, alex).await.unwrap().mutual);

    let alex_sees: Vec<Uuid> = h
        .matches
        .discover(alex)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    let sarah_sees: Vec<Uuid> = h
        .matches
        .discover(sarah)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(alex_sees, vec![fresh]);
    assert_eq!(sarah_sees, vec![fresh]);
}

#[tokio::test]
async fn test_dislike_is_idempotent() {
    let h = Harness::new();
    let alex = h.user_with_profile("alex_k", &["Coffee"]).await;
    let mike = h.user_with_profile("mike_r", &["Gaming"]).await;

    assert!(h.matches.dislike(alex, mike).await.unwrap());
    assert!(!h.matches.dislike(alex, mike).await.unwrap());
    assert!(!h.matches.dislike(mike, alex).await.unwrap());
    assert_eq!(h.store.match_count().await, 1);

    let self_dislike = h.matches.dislike(alex, alex).await;
    assert!(matches!(self_dislike, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_failed_like_leaves_no_record() {
    let h = Harness::new();
    let alex = h.user_with_profile("alex_k", &["Coffee"]).await;
    let bare = h.store.add_user("no_profile").await.unwrap();

    assert_err!(h.matches.like(alex, bare.id).await);
    assert_eq!(h.store.match_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_likes_keep_pair_invariant() {
    let h = Arc::new(Harness::new());
    let alex = h.user_with_profile("alex_k", &["Coffee"]).await;
    let sarah = h.user_with_profile("sarah_m", &["Coffee"]).await;

    let (a, b) = tokio::join!(h.matches.like(alex, sarah), h.matches.like(sarah, alex));
    let a = a.unwrap();
    let b = b.unwrap();

    // Exactly one of the two likes completes the match
    assert!(a.mutual ^ b.mutual);
    assert_eq!(h.store.match_count().await, 1);
}

#[tokio::test]
async fn test_group_admin_continuity() {
    let h = Harness::new();
    let owner = h.store.add_user("owner").await.unwrap();
    let early = h.store.add_user("early").await.unwrap();
    let late = h.store.add_user("late").await.unwrap();

    let group = h
        .groups
        .create(owner.id, "Coffee Connoisseurs", Some("Perfect brew"), false)
        .await
        .unwrap();
    h.groups.join(early.id, group.id).await.unwrap();
    h.groups.join(late.id, group.id).await.unwrap();

    h.groups.leave(owner.id, group.id).await.unwrap();

    let detail = h.groups.group_detail(late.id, group.id).await.unwrap();
    let admins: Vec<Uuid> = detail
        .members
        .iter()
        .filter(|m| m.role == GroupRole::Admin)
        .map(|m| m.id)
        .collect();
    assert_eq!(admins, vec![early.id]);

    h.groups.leave(early.id, group.id).await.unwrap();
    let detail = h.groups.group_detail(late.id, group.id).await.unwrap();
    assert_eq!(detail.user_role, Some(GroupRole::Admin));

    h.groups.leave(late.id, group.id).await.unwrap();
    assert!(matches!(
        h.groups.group_detail(late.id, group.id).await,
        Err(AppError::NotFound(_))
    ));
}

// HTTP surface

fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id,
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

macro_rules! test_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(
                    $store.clone(),
                    Matcher::with_default_weights(),
                    Some(Arc::new(CacheManager::local(100, 60))),
                )))
                .app_data(web::Data::new(IdentityResolver::Jwt(JwtVerifier::new(SECRET))))
                .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
                .app_data(web::PathConfig::default().error_handler(routes::handle_path_error))
                .configure(routes::configure_routes::<MemoryStore>),
        )
        .await
    };
}

#[actix_web::test]
async fn test_http_health_is_public() {
    let store = Arc::new(MemoryStore::new());
    let app = test_app!(store);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_http_requires_token() {
    let store = Arc::new(MemoryStore::new());
    let app = test_app!(store);

    let req = test::TestRequest::get().uri("/api/v1/matching/discover").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unauthenticated");
    assert_eq!(body["status_code"], 401);

    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_http_profile_and_matching_flow() {
    let store = Arc::new(MemoryStore::new());
    let app = test_app!(store);
    let alex = store.add_user("alex_k").await.unwrap();
    let sarah = store.add_user("sarah_m").await.unwrap();

    let me: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/me")
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex.id))))
            .to_request(),
    )
    .await;
    assert_eq!(me["hasCompletedProfile"], false);

    // Discovery before a profile exists
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/matching/discover")
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex.id))))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    for user in [&alex, &sarah] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/profile")
                .insert_header(("Authorization", format!("Bearer {}", token_for(user.id))))
                .set_json(json!({
                    "age": 28,
                    "location": "San Francisco",
                    "personalityTraits": ["Creative"],
                    "likes": ["Coffee", "Art"]
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Second profile creation conflicts
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/profile")
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex.id))))
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let discovered: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/matching/discover")
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex.id))))
            .to_request(),
    )
    .await;
    assert_eq!(discovered["matches"][0]["id"], sarah.id.to_string());
    assert_eq!(discovered["matches"][0]["match_score"], 100.0);

    let liked: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/matching/like/{}", sarah.id))
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex.id))))
            .to_request(),
    )
    .await;
    assert_eq!(liked["is_mutual"], false);

    // Cached discovery was invalidated by the like
    let discovered: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/matching/discover")
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex.id))))
            .to_request(),
    )
    .await;
    assert_eq!(discovered["matches"].as_array().map(Vec::len), Some(0));

    let liked_back: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/matching/like/{}", alex.id))
            .insert_header(("Authorization", format!("Bearer {}", token_for(sarah.id))))
            .to_request(),
    )
    .await;
    assert_eq!(liked_back["is_mutual"], true);

    let matches: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/matching/matches")
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex.id))))
            .to_request(),
    )
    .await;
    assert_eq!(matches["matches"][0]["user"]["username"], "sarah_m");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/matching/like/{}", alex.id))
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex.id))))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

macro_rules! discovered_ids {
    ($app:expr, $user_id:expr) => {{
        let body: Value = test::call_and_read_body_json(
            &$app,
            test::TestRequest::get()
                .uri("/api/v1/matching/discover")
                .insert_header(("Authorization", format!("Bearer {}", token_for($user_id))))
                .to_request(),
        )
        .await;

        body["matches"]
            .as_array()
            .map(|matches| {
                matches
                    .iter()
                    .filter_map(|m| m["id"].as_str().map(str::to_string))
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default()
    }};
}

#[actix_web::test]
async fn test_http_cached_discovery_drops_users_evaluated_elsewhere() {
    let store = Arc::new(MemoryStore::new());
    let first = test_app!(store);
    let second = test_app!(store);

    let h = Harness::with_store(store.clone());
    let alex = h.user_with_profile("alex", &["Coffee", "Art"]).await;
    let sarah = h.user_with_profile("sarah", &["coffee", "art"]).await;
    let mike = h.user_with_profile("mike", &["Coffee", "art"]).await;

    // Both instances cache a list containing the other two users
    assert_eq!(discovered_ids!(first, alex).len(), 2);
    assert_eq!(discovered_ids!(first, sarah).len(), 2);

    let resp = test::call_service(
        &second,
        test::TestRequest::post()
            .uri(&format!("/api/v1/matching/dislike/{}", sarah))
            .insert_header(("Authorization", format!("Bearer {}", token_for(alex))))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(discovered_ids!(first, alex), vec![mike.to_string()]);
    assert_eq!(discovered_ids!(first, sarah), vec![mike.to_string()]);

    // A mutual match made on one instance hides the pair on the other
    for (from, to) in [(alex, mike), (mike, alex)] {
        let resp = test::call_service(
            &second,
            test::TestRequest::post()
                .uri(&format!("/api/v1/matching/like/{}", to))
                .insert_header(("Authorization", format!("Bearer {}", token_for(from))))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert!(discovered_ids!(first, alex).is_empty());
    assert!(!discovered_ids!(first, mike).contains(&alex.to_string()));
}

#[actix_web::test]
async fn test_http_group_flow() {
    let store = Arc::new(MemoryStore::new());
    let app = test_app!(store);
    let owner = store.add_user("owner").await.unwrap();
    let joiner = store.add_user("joiner").await.unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/groups/create")
            .insert_header(("Authorization", format!("Bearer {}", token_for(owner.id))))
            .set_json(json!({"name": "Coffee Connoisseurs", "description": "Perfect brew"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let group_id = created["group"]["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/groups/create")
            .insert_header(("Authorization", format!("Bearer {}", token_for(owner.id))))
            .set_json(json!({"description": "nameless"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let found: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/groups/discover?search=brew")
            .insert_header(("Authorization", format!("Bearer {}", token_for(joiner.id))))
            .to_request(),
    )
    .await;
    assert_eq!(found["groups"][0]["id"], group_id.as_str());
    assert_eq!(found["groups"][0]["member_count"], 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/groups/{}/join", group_id))
            .insert_header(("Authorization", format!("Bearer {}", token_for(joiner.id))))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/groups/{}/join", group_id))
            .insert_header(("Authorization", format!("Bearer {}", token_for(joiner.id))))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let detail: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/groups/{}", group_id))
            .insert_header(("Authorization", format!("Bearer {}", token_for(joiner.id))))
            .to_request(),
    )
    .await;
    assert_eq!(detail["group"]["is_member"], true);
    assert_eq!(detail["group"]["user_role"], "member");
    assert_eq!(detail["group"]["members"].as_array().map(Vec::len), Some(2));

    let mine: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/groups/my")
            .insert_header(("Authorization", format!("Bearer {}", token_for(owner.id))))
            .to_request(),
    )
    .await;
    assert_eq!(mine["groups"][0]["role"], "admin");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/groups/not-a-uuid")
            .insert_header(("Authorization", format!("Bearer {}", token_for(owner.id))))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_http_malformed_json() {
    let store = Arc::new(MemoryStore::new());
    let app = test_app!(store);
    let user = store.add_user("alex_k").await.unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/profile")
            .insert_header(("Authorization", format!("Bearer {}", token_for(user.id))))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
}
