#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use entropy_core::search::{
    Peak, QueryResult, SearchParams, SearchReport, SearchWorker, SpectrumHit, WorkerError,
    WorkerFactory,
};
use entropy_api::config::{LogFormat, ServerConfig};
use entropy_api::engine::{JobRegistry, JobService, StatusView};
use entropy_api::router::build_app_router;
use entropy_api::state::AppState;
use entropy_api::storage::UploadStore;
use entropy_search::{DisplayProjector, EntropyWorkerFactory};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults, storing uploads in `upload_dir`.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        cors_origins: vec!["http://localhost:5001".to_string()],
        request_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 16 * 1024 * 1024,
        log_format: LogFormat::Text,
    }
}

pub fn job_service(workers: Arc<dyn WorkerFactory>) -> JobService {
    JobService::new(
        Arc::new(JobRegistry::new()),
        workers,
        Arc::new(DisplayProjector),
    )
}

/// Build the full application router (same middleware stack as `main.rs`)
/// around the given worker factory. The returned state shares the registry.
pub fn build_test_app(workers: Arc<dyn WorkerFactory>, upload_dir: &Path) -> (Router, AppState) {
    let config = test_config(upload_dir);
    let state = AppState {
        jobs: job_service(workers),
        uploads: Arc::new(UploadStore::new(upload_dir)),
    };
    (build_app_router(state.clone(), &config), state)
}

/// Application wired to the real entropy search worker.
pub fn build_real_app(upload_dir: &Path) -> (Router, AppState) {
    build_test_app(Arc::new(EntropyWorkerFactory), upload_dir)
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_multipart(app: &Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let (content_type, body) = multipart_body(parts);
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Job id from a `303 See Other` to `/status/{id}`.
pub fn redirect_job_id(response: &Response<Body>) -> String {
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("redirect must carry a Location header")
        .to_str()
        .unwrap();
    location
        .strip_prefix("/status/")
        .expect("redirect must target the status page")
        .to_string()
}

/// Poll `/api/status/{id}` until the job reaches `finished` or `error`.
pub async fn wait_for_http_terminal(app: &Router, id: &str) -> serde_json::Value {
    for _ in 0..500 {
        let status = body_json(get(app, &format!("/api/status/{id}")).await).await;
        if status["status"] == "finished" || status["status"] == "error" {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not reach a terminal state");
}

/// Poll the service until the job reaches `finished` or `error`.
pub async fn wait_for_terminal(jobs: &JobService, id: &str) -> StatusView {
    for _ in 0..500 {
        let status = jobs.get_status(id).await;
        if status.status == "finished" || status.status == "error" {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not reach a terminal state");
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "entropy-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        file_name: &'a str,
        content: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                field,
                file_name,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const LIBRARY_MGF: &str = "\
BEGIN IONS
TITLE=caffeine
PEPMASS=195.0877
110.0713 35
138.0662 100
163.0600 20
END IONS
BEGIN IONS
TITLE=theobromine
PEPMASS=181.0720
67.0300 12
138.0500 100
163.0400 30
END IONS
BEGIN IONS
TITLE=unrelated
PEPMASS=195.0880
50.0000 100
60.0000 80
END IONS
";

pub const QUERY_MGF: &str = "\
BEGIN IONS
TITLE=unknown 1
PEPMASS=195.0875
SCANS=7
110.0710 30
138.0660 100
163.0605 25
END IONS
BEGIN IONS
TITLE=unknown 2
PEPMASS=181.0721
SCANS=8
67.0305 10
138.0495 100
163.0410 28
END IONS
";

pub const CORRUPT_MGF: &str = "BEGIN IONS\nTITLE=broken\n100.0 not-a-number\nEND IONS\n";

// ---------------------------------------------------------------------------
// Fake search workers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    FailLoad,
    FailSearch,
    Panic,
}

/// Worker factory with scripted outcomes.
///
/// When gated, every worker blocks in `load_reference` until the test
/// releases one token via [`FakeWorkerFactory::release`].
pub struct FakeWorkerFactory {
    behavior: Behavior,
    gate: Option<(Mutex<mpsc::Sender<()>>, Arc<Mutex<mpsc::Receiver<()>>>)>,
    created: Arc<AtomicUsize>,
}

impl FakeWorkerFactory {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            gate: None,
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn gated(behavior: Behavior) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            gate: Some((Mutex::new(tx), Arc::new(Mutex::new(rx)))),
            ..Self::new(behavior)
        }
    }

    /// Let `n` blocked workers continue.
    pub fn release(&self, n: usize) {
        if let Some((tx, _)) = &self.gate {
            let tx = tx.lock().unwrap();
            for _ in 0..n {
                tx.send(()).unwrap();
            }
        }
    }

    /// Number of workers created so far.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl WorkerFactory for FakeWorkerFactory {
    fn create(&self, _params: &SearchParams) -> Box<dyn SearchWorker> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeWorker {
            behavior: self.behavior,
            gate: self.gate.as_ref().map(|(_, rx)| Arc::clone(rx)),
        })
    }
}

struct FakeWorker {
    behavior: Behavior,
    gate: Option<Arc<Mutex<mpsc::Receiver<()>>>>,
}

impl SearchWorker for FakeWorker {
    fn load_reference(&mut self, _path: &Path) -> Result<(), WorkerError> {
        if let Some(gate) = &self.gate {
            gate.lock().unwrap().recv().unwrap();
        }
        match self.behavior {
            Behavior::FailLoad => Err(WorkerError::Load("library is corrupt".into())),
            Behavior::Panic => panic!("worker blew up while loading"),
            _ => Ok(()),
        }
    }

    fn search(
        &mut self,
        _query_path: &Path,
        params: &SearchParams,
    ) -> Result<SearchReport, WorkerError> {
        if self.behavior == Behavior::FailSearch {
            return Err(WorkerError::Search("query file is empty".into()));
        }
        Ok(sample_report(params.top_n))
    }
}

/// One scanned query with `top_n` open-search hits, plus one unscanned query.
pub fn sample_report(top_n: usize) -> SearchReport {
    let hits: Vec<SpectrumHit> = (0..top_n.min(3))
        .map(|i| SpectrumHit {
            library_index: i,
            library_title: Some(format!("compound {i}")),
            library_precursor_mz: Some(195.0 + i as f64),
            similarity: 0.9 - 0.1 * i as f64,
        })
        .collect();
    SearchReport {
        spectra: vec![
            QueryResult {
                scan_number: Some(1),
                title: Some("query 1".into()),
                precursor_mz: Some(195.0875),
                peaks: vec![Peak {
                    mz: 138.0662,
                    intensity: 1.0,
                }],
                identity_search: hits.iter().take(1).cloned().collect(),
                open_search: hits,
                ..QueryResult::default()
            },
            QueryResult {
                scan_number: None,
                title: Some("no scan".into()),
                ..QueryResult::default()
            },
        ],
    }
}
