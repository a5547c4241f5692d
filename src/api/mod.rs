use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post, put};
use std::sync::{Arc, RwLock};

pub mod handlers;
pub mod responses;

pub fn router(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::get_health))
        .route("/api/overview", get(handlers::get_overview))
        .route("/api/campuses/{code}", get(handlers::get_campus))
        .route("/api/selection", put(handlers::put_selection))
        .route("/api/readings", post(handlers::post_readings))
        .with_state(state)
}
