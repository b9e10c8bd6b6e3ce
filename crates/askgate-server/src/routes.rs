//! Route definitions.

use crate::state::AppState;
use crate::{assets, handlers, middleware};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// Agent routes are wrapped in the bearer gate with `route_layer`, so
/// unknown paths still 404 instead of 401.
pub fn create_router(state: AppState, ui_enabled: bool) -> Router {
    let protected = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/update-df", post(handlers::update_df))
        .route("/context", post(handlers::context_chat))
        .route("/update-context", post(handlers::update_context))
        .route("/sql", post(handlers::sql_chat))
        .route("/update-sql", post(handlers::update_sql))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_bearer));

    let mut router = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/auth/token", post(handlers::issue_token))
        .merge(protected);

    if ui_enabled {
        router = router
            .route("/", get(assets::index))
            .route("/assets/{*path}", get(assets::asset));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
