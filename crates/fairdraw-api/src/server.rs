use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Create the API application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Health and info
        .route("/health", get(handlers::health))
        .route("/v1/config", get(handlers::get_config))
        .route("/v1/events", get(handlers::list_events))

        // Operator
        .route("/v1/rounds/current", get(handlers::current_round))
        .route("/v1/rounds/advance", post(handlers::advance))
        .route("/v1/rounds/open", post(handlers::open_round))
        .route("/v1/rounds/:round/finalize", post(handlers::finalize))

        // Consumers
        .route("/v1/rounds/:round", get(handlers::get_round))
        .route("/v1/rounds/:round/result", get(handlers::get_result))
        .route("/v1/rounds/:round/sample", get(handlers::sample))

        // Oracle
        .route("/v1/vrf/callback", post(handlers::vrf_callback))
        .route("/v1/requests/:request_id", get(handlers::get_request))

        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
