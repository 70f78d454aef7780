mod middleware;
mod profiles;
mod users;

use std::sync::Arc;

use axum::Router;

use crate::service::AccountsService;

/// Shared application state.
pub type AppState = Arc<AccountsService>;

/// Build the complete accounts API router.
///
/// Routes are nested under `/accounts`. The auth middleware runs on every
/// request and stores verified claims as a request extension; register and
/// login are exempt.
pub fn build_router(svc: Arc<AccountsService>) -> Router {
    let api = Router::new()
        .merge(users::routes())
        .merge(profiles::routes());

    Router::new()
        .nest("/accounts", api)
        .layer(axum::middleware::from_fn_with_state(
            svc.clone(),
            middleware::auth_middleware,
        ))
        .with_state(svc)
}
