use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::models::{
    CreateGroupRequest, CreateGroupResponse, GroupResponse, GroupSearchQuery, GroupsResponse,
    MessageResponse,
};
use crate::routes::{AppState, AuthUser};
use crate::services::RecordStore;

/// Configure group routes
///
/// Literal paths are registered ahead of `/groups/{group_id}`.
pub fn configure<S: RecordStore>(cfg: &mut web::ServiceConfig) {
    cfg.route("/groups/discover", web::get().to(discover_groups::<S>))
        .route("/groups/my", web::get().to(my_groups::<S>))
        .route("/groups/create", web::post().to(create_group::<S>))
        .route("/groups/{group_id}/join", web::post().to(join_group::<S>))
        .route("/groups/{group_id}/leave", web::post().to(leave_group::<S>))
        .route("/groups/{group_id}", web::get().to(group_detail::<S>));
}

/// GET /api/v1/groups/discover?search=coffee
async fn discover_groups<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
    query: web::Query<GroupSearchQuery>,
) -> AppResult<HttpResponse> {
    let groups = state
        .groups
        .discover_groups(user.id, query.search.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(GroupsResponse { groups }))
}

async fn my_groups<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
) -> AppResult<HttpResponse> {
    let groups = state.groups.my_groups(user.id).await?;
    Ok(HttpResponse::Ok().json(GroupsResponse { groups }))
}

/// POST /api/v1/groups/create
///
/// Request body:
/// ```json
/// {
///   "name": "Coffee Connoisseurs",
///   "description": "Discussing the perfect brew",
///   "isPremium": false
/// }
/// ```
async fn create_group<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
    req: web::Json<CreateGroupRequest>,
) -> AppResult<HttpResponse> {
    req.validate()?;

    let group = state
        .groups
        .create(user.id, &req.name, req.description.as_deref(), req.is_premium)
        .await?;

    Ok(HttpResponse::Created().json(CreateGroupResponse {
        message: "Group created successfully".to_string(),
        group,
    }))
}

async fn join_group<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.groups.join(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully joined group")))
}

async fn leave_group<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.groups.leave(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully left group")))
}

async fn group_detail<S: RecordStore>(
    state: web::Data<AppState<S>>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let group = state.groups.group_detail(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(GroupResponse { group }))
}
