use axum::extract::{Extension, Path, Query, State};
use axum::http::{StatusCode, header::SET_COOKIE};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use roster_core::{ListParams, ListResult, ServiceError};

use crate::api::AppState;
use crate::api::middleware::ACCESS_COOKIE;
use crate::model::{
    Claims, LoginRequest, Principal, RegisterRequest, RegisterResponse, TokenPair, UpdateUserRole,
    UserPublic,
};
use crate::service::guard::{ADMIN_ONLY, ANY_ROLE, STAFF_OR_ABOVE};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/me", get(me))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/users/{id}/role", put(update_role))
}

/// POST /accounts/users/register — create a user and profile atomically.
async fn register(
    State(svc): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (user, profile, pin) = svc
        .create_user_profile(req.user, req.profile)
        .map_err(ServiceError::from)?;

    let body = RegisterResponse {
        user_id: user.user_id,
        pin,
        profile_id: profile.profile_id,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /accounts/users/login — PIN login. Returns the token pair and also
/// sets the access token as an HTTP-only cookie for browser clients.
async fn login(
    State(svc): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (tokens, _user) = svc
        .login(&req.user_id, &req.pin)
        .map_err(ServiceError::from)?;

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Max-Age={}; Path=/",
        ACCESS_COOKIE, tokens.access_token, tokens.expires_in,
    );
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json::<TokenPair>(tokens),
    ))
}

/// POST /accounts/users/logout — clear the access cookie. Public, so an
/// expired session can still log out; tokens are not revoked server-side,
/// they lapse at expiry.
async fn logout() -> impl IntoResponse {
    let cookie = format!("{}=; HttpOnly; SameSite=Lax; Max-Age=0; Path=/", ACCESS_COOKIE);
    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(serde_json::json!({"status": "logged out"})),
    )
}

/// GET /accounts/users/me — the caller's own user and profile.
async fn me(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Principal>, ServiceError> {
    let principal = svc
        .require_role(&claims, ANY_ROLE)
        .map_err(ServiceError::from)?;
    Ok(Json(principal))
}

/// GET /accounts/users — list active users.
async fn list_users(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<UserPublic>>, ServiceError> {
    svc.require_role(&claims, ADMIN_ONLY)
        .map_err(ServiceError::from)?;
    svc.list_users(&params)
        .map(Json)
        .map_err(ServiceError::from)
}

/// GET /accounts/users/{id}
async fn get_user(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<UserPublic>, ServiceError> {
    svc.require_role(&claims, STAFF_OR_ABOVE)
        .map_err(ServiceError::from)?;
    svc.get_user(&id).map(Json).map_err(ServiceError::from)
}

/// PUT /accounts/users/{id}/role
async fn update_role(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRole>,
) -> Result<Json<UserPublic>, ServiceError> {
    svc.require_role(&claims, ADMIN_ONLY)
        .map_err(ServiceError::from)?;
    svc.update_user_role(&id, req.role)
        .map(Json)
        .map_err(ServiceError::from)
}

/// DELETE /accounts/users/{id} — soft delete, cascading to the profile.
async fn delete_user(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.require_role(&claims, ADMIN_ONLY)
        .map_err(ServiceError::from)?;
    svc.delete_user(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
