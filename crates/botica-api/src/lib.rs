//! botica-api
//!
//! HTTP surface of the pharmacy recommendation service.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/recommendations/generate",
            post(routes::recommendations::generate),
        )
        .route(
            "/recommendations",
            get(routes::recommendations::query).post(routes::recommendations::persist),
        )
        .route(
            "/recommendations/{id}",
            get(routes::recommendations::get_one),
        )
        .route(
            "/recommendations/{id}/export",
            post(routes::exports::export_recommendation),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum_mw::from_fn(middleware::audit::audit_log))
                .layer(cors),
        )
        .with_state(state)
}
