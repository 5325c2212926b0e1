use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/account", post(handlers::create_account))
        .route("/api/profile", get(handlers::get_profile).put(handlers::update_profile))
        .route("/api/habits", get(handlers::get_habits).post(handlers::replace_habits))
        .route("/api/habits/:id/toggle", put(handlers::toggle_habit))
        .route("/api/settings", get(handlers::get_settings).put(handlers::update_settings))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/export", get(handlers::export_data))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
