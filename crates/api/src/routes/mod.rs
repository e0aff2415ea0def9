pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree (without middleware or state).
pub fn app_routes() -> Router<AppState> {
    Router::new().merge(health::router()).merge(jobs::router())
}
