//! Top-level HTTP router

use axum::routing::get;
use axum::Router;

use super::state::AppState;
use super::{health, v1};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1/users", v1::users::create_users_router())
        .nest("/v1/auth", v1::auth::create_auth_router())
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
