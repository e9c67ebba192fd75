// All functions in this module are shared test helpers. Not every test binary
// uses every helper, so we suppress dead_code warnings at the item level.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use aura_api::checkins::CheckinBoard;
use aura_api::config::ServerConfig;
use aura_api::router::build_app_router;
use aura_api::state::AppState;
use aura_api::submit::endpoints::EndpointRegistry;
use aura_core::keys::{self, KeyScope};
use aura_core::status::JobStatus;
use aura_db::repositories::{AdminRepo, JobRepo, PrecedingRepo, ProjectRepo, RunnerRepo};

/// Build a test `ServerConfig` writing artifacts into `artifacts_dir`.
pub fn test_config(artifacts_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        artifacts_dir: artifacts_dir.to_path_buf(),
        request_timeout_secs: 30,
        config_path: "config.json".into(),
    }
}

/// Build the full application router with the given endpoint registry, so
/// integration tests exercise the same middleware stack production uses.
pub fn build_app_with(
    pool: &SqlitePool,
    registry: EndpointRegistry,
    artifacts_dir: &Path,
) -> Router {
    let config = test_config(artifacts_dir);
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        endpoints: Arc::new(registry),
        checkins: Arc::new(CheckinBoard::default()),
    };
    build_app_router(state, &config)
}

/// Router with only the generic submit endpoint and a scratch artifacts
/// directory. Storage tests pass their own directory instead.
pub fn build_app(pool: &SqlitePool) -> Router {
    build_app_with(
        pool,
        EndpointRegistry::generic_only(),
        &std::env::temp_dir().join("aura-test-artifacts"),
    )
}

// ---------------------------------------------------------------------------
// Shared HTTP test helpers
// ---------------------------------------------------------------------------

/// Collect the response body into a `serde_json::Value`.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST JSON to the given URI without authentication.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST JSON with a Bearer key.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    key: &str,
) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {key}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST raw bytes with arbitrary extra headers.
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
) -> axum::response::Response {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body)).unwrap();
    app.oneshot(request).await.unwrap()
}

/// GET from the given URI.
pub async fn get(app: Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

/// Mint and store the admin key; returns the plaintext.
pub async fn create_admin(pool: &SqlitePool) -> String {
    let minted = keys::mint(KeyScope::Admin).expect("minting should succeed");
    AdminRepo::create(pool, &minted.hash)
        .await
        .expect("admin creation should succeed");
    minted.plaintext
}

/// Create a project; returns its id and plaintext key.
pub async fn create_project(pool: &SqlitePool, name: &str, slug: &str) -> (i64, String) {
    let minted = keys::mint(KeyScope::Project).expect("minting should succeed");
    let id = ProjectRepo::create(pool, name, slug, &minted.hash)
        .await
        .expect("project creation should succeed");
    (id, minted.plaintext)
}

/// Create a runner; returns its id and plaintext key.
pub async fn create_runner(pool: &SqlitePool, name: &str) -> (i64, String) {
    let minted = keys::mint(KeyScope::Runner).expect("minting should succeed");
    let id = RunnerRepo::create(pool, name, &minted.hash)
        .await
        .expect("runner creation should succeed");
    (id, minted.plaintext)
}

/// Submit a minimal job via the API and return its id.
pub async fn submit_job(
    app: Router,
    key: &str,
    project: &str,
    name: &str,
    tag: &str,
    preceding: &[i64],
) -> i64 {
    let response = post_json_auth(
        app,
        "/api/submit",
        serde_json::json!({
            "project": project,
            "entityKey": "rev",
            "entityVal": "1",
            "name": name,
            "cmd": "echo ok",
            "env": "",
            "tag": tag,
            "precedingJobs": preceding,
        }),
        key,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"]
        .as_i64()
        .expect("submit response should carry a job id")
}

/// Check in a runner and return the `jobs` array from the response.
pub async fn check_in(
    app: Router,
    runner: &str,
    key: &str,
    tags: &[&str],
    limit: i64,
) -> Vec<serde_json::Value> {
    let response = post_json_auth(
        app,
        "/api/runner",
        serde_json::json!({"name": runner, "tags": tags, "limit": limit}),
        key,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["jobs"]
        .as_array()
        .expect("runner response should carry a jobs array")
        .clone()
}

// ---------------------------------------------------------------------------
// Polling helpers (submission post-processing runs on detached tasks)
// ---------------------------------------------------------------------------

const POLL_ATTEMPTS: u32 = 200;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Wait until a job reaches the given status.
pub async fn wait_for_status(pool: &SqlitePool, job_id: i64, status: JobStatus) {
    for _ in 0..POLL_ATTEMPTS {
        let job = JobRepo::find_by_id(pool, job_id)
            .await
            .expect("job lookup should succeed")
            .expect("job should exist");
        if job.status() == Some(status) {
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    panic!("job {job_id} did not reach {status:?} in time");
}

/// Wait until no preceding link has `older` as its older side.
pub async fn wait_for_links_cleared(pool: &SqlitePool, older: i64) {
    for _ in 0..POLL_ATTEMPTS {
        let successors = PrecedingRepo::succeeding_ids(pool, older)
            .await
            .expect("link lookup should succeed");
        if successors.is_empty() {
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    panic!("links of job {older} were not cleared in time");
}
