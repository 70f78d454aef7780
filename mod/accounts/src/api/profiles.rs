use axum::extract::{Extension, Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use roster_core::ServiceError;

use crate::api::AppState;
use crate::model::{Claims, Profile, Role, UpdateProfile, UserPublic};
use crate::service::guard::{ADMIN_ONLY, STAFF_OR_ABOVE};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles))
        .route(
            "/profiles/{id}",
            get(get_profile).patch(update_profile).delete(delete_profile),
        )
}

#[derive(Deserialize)]
struct ProfilesQuery {
    role: Role,
    q: Option<String>,
}

#[derive(serde::Serialize)]
struct ProfileEntry {
    user: UserPublic,
    profile: Profile,
}

/// GET /accounts/profiles?role=&q= — users of one role with their profiles,
/// optionally filtered by name or email substring.
async fn list_profiles(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ProfilesQuery>,
) -> Result<Json<Vec<ProfileEntry>>, ServiceError> {
    svc.require_role(&claims, STAFF_OR_ABOVE)
        .map_err(ServiceError::from)?;
    let items = svc
        .list_profiles_by_role(query.role, query.q.as_deref())
        .map_err(ServiceError::from)?;
    Ok(Json(
        items
            .into_iter()
            .map(|(user, profile)| ProfileEntry { user, profile })
            .collect(),
    ))
}

/// GET /accounts/profiles/{id}
async fn get_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Profile>, ServiceError> {
    svc.require_role(&claims, STAFF_OR_ABOVE)
        .map_err(ServiceError::from)?;
    svc.get_profile(&id).map(Json).map_err(ServiceError::from)
}

/// PATCH /accounts/profiles/{id} — partial update.
async fn update_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(changes): Json<UpdateProfile>,
) -> Result<Json<Profile>, ServiceError> {
    svc.require_role(&claims, ADMIN_ONLY)
        .map_err(ServiceError::from)?;
    svc.update_profile(&id, changes)
        .map(Json)
        .map_err(ServiceError::from)
}

/// DELETE /accounts/profiles/{id} — soft delete.
async fn delete_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.require_role(&claims, ADMIN_ONLY)
        .map_err(ServiceError::from)?;
    svc.delete_profile(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
