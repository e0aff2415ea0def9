//! Upload form and search submission.

use std::path::PathBuf;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::{Html, Redirect};
use entropy_core::job::JobId;
use entropy_core::search::{
    SearchInputs, SearchParams, DEFAULT_MS1_TOLERANCE, DEFAULT_MS2_TOLERANCE, DEFAULT_TOP_N,
};

use crate::error::{AppError, AppResult};
use crate::pages;
use crate::state::AppState;
use crate::storage::UploadGuard;

pub const FIELD_QUERY: &str = "file_query";
pub const FIELD_LIBRARY: &str = "file_library";

/// An uploaded file buffered in memory.
#[derive(Debug)]
struct UploadedFile {
    file_name: String,
    data: Bytes,
}

/// Raw form contents, before validation.
#[derive(Debug, Default)]
struct SearchForm {
    query: Option<UploadedFile>,
    library: Option<UploadedFile>,
    ms1_tolerance: Option<String>,
    ms2_tolerance: Option<String>,
    top_n: Option<String>,
}

impl SearchForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FIELD_QUERY | FIELD_LIBRARY => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await?;
                    let upload = Some(UploadedFile { file_name, data });
                    if name == FIELD_QUERY {
                        form.query = upload;
                    } else {
                        form.library = upload;
                    }
                }
                "ms1_tolerance" | "ms1_tolerance_in_da" => {
                    form.ms1_tolerance = Some(field.text().await?);
                }
                "ms2_tolerance" | "ms2_tolerance_in_da" => {
                    form.ms2_tolerance = Some(field.text().await?);
                }
                "top_n" => form.top_n = Some(field.text().await?),
                _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn params(&self) -> AppResult<SearchParams> {
        Ok(SearchParams {
            ms1_tolerance: parse_field(
                "ms1_tolerance",
                self.ms1_tolerance.as_deref(),
                DEFAULT_MS1_TOLERANCE,
            )?,
            ms2_tolerance: parse_field(
                "ms2_tolerance",
                self.ms2_tolerance.as_deref(),
                DEFAULT_MS2_TOLERANCE,
            )?,
            top_n: parse_field("top_n", self.top_n.as_deref(), DEFAULT_TOP_N)?,
        })
    }
}

/// Parse an optional text field. Absent or blank fields take the default.
fn parse_field<T: std::str::FromStr>(name: &str, raw: Option<&str>, default: T) -> AppResult<T> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid value '{value}' for {name}"))),
    }
}

fn require_file(upload: Option<UploadedFile>, field: &str) -> AppResult<UploadedFile> {
    let upload = upload
        .ok_or_else(|| AppError::BadRequest(format!("Missing required file field '{field}'")))?;
    if upload.data.is_empty() {
        return Err(AppError::BadRequest(format!("Uploaded file '{field}' is empty")));
    }
    Ok(upload)
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(pages::INDEX_HTML)
}

/// POST /search
///
/// Accepts the query and library uploads plus optional tolerances, stores
/// the files under a fresh job id and starts the search. Redirects (303) to
/// the status page. Uploads are removed again if the submission fails or is
/// cancelled before the job is registered.
pub async fn submit_search(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let mut form = SearchForm::read(multipart).await?;
    let params = form.params()?;
    params.validate()?;
    let query = require_file(form.query.take(), FIELD_QUERY)?;
    let library = require_file(form.library.take(), FIELD_LIBRARY)?;

    let id = JobId::new();
    let uploads = UploadGuard::new(state.uploads.clone(), id);
    let (query_path, reference_path) = store_uploads(&state, &id, &query, &library).await?;

    let inputs = SearchInputs {
        query_path,
        reference_path,
        params,
    };
    state.jobs.submit_as(id, inputs).await?;
    uploads.keep();

    Ok(Redirect::to(&format!("/status/{id}")))
}

async fn store_uploads(
    state: &AppState,
    id: &JobId,
    query: &UploadedFile,
    library: &UploadedFile,
) -> AppResult<(PathBuf, PathBuf)> {
    let query_path = state
        .uploads
        .save_upload(id, "query", &query.file_name, &query.data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to save query upload: {e}")))?;
    let reference_path = state
        .uploads
        .save_upload(id, "library", &library.file_name, &library.data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to save library upload: {e}")))?;
    Ok((query_path, reference_path))
}
