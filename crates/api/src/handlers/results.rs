use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::error::AppResult;
use crate::pages;
use crate::response::DataResponse;
use crate::state::AppState;

/// Plain-text body for result requests on jobs that are not finished.
pub const NOT_READY_TEXT: &str = "Job not found or not finished.";

/// GET /results/{id}
pub async fn results_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.jobs.get_results(&id).await {
        Ok(results) => Html(pages::results_page(&id, &results)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, NOT_READY_TEXT).into_response(),
    }
}

/// GET /api/results/{id}
pub async fn get_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Value>>> {
    let data = state.jobs.get_results(&id).await?;
    Ok(Json(DataResponse { data }))
}
