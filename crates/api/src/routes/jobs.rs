//! Route definitions for the search workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{results, search, status};
use crate::state::AppState;

/// Browser and JSON routes for submitting and following search jobs.
///
/// ```text
/// GET    /                    -> upload form
/// POST   /search              -> submit_search (303 to /status/{id})
/// GET    /status/{id}         -> status_page
/// GET    /api/status/{id}     -> get_status
/// GET    /results/{id}        -> results_page
/// GET    /api/results/{id}    -> get_results
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search::index))
        .route("/search", post(search::submit_search))
        .route("/status/{id}", get(status::status_page))
        .route("/api/status/{id}", get(status::get_status))
        .route("/results/{id}", get(results::results_page))
        .route("/api/results/{id}", get(results::get_results))
}
