use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;

use crate::engine::StatusView;
use crate::pages;
use crate::state::AppState;

/// GET /status/{id}
///
/// HTML shell that polls the JSON status endpoint. Rendered for any id;
/// unknown ids show up as `not_found` on the first poll.
pub async fn status_page(Path(id): Path<String>) -> Html<String> {
    Html(pages::status_page(&id))
}

/// GET /api/status/{id}
///
/// Always 200. Unknown ids report `not_found`.
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<StatusView> {
    Json(state.jobs.get_status(&id).await)
}
