use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use pagevault_core::{Archive, EngineConfig, ScanRecord, SearchResults, SledStore};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Deserialize)]
pub struct RecentParams {
    #[serde(default = "default_recent")]
    pub limit: usize,
}
fn default_recent() -> usize { 20 }

#[derive(Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_k")]
    pub limit: usize,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    #[serde(flatten)]
    pub results: SearchResults,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub id: u32,
    pub change: String,
}

type ApiError = (StatusCode, String);

fn internal(err: anyhow::Error) -> ApiError {
    tracing::error!(error = %err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Queries share the read lock; indexing takes the write lock so a word
/// record is never rewritten while another pass reads or writes it.
#[derive(Clone)]
pub struct AppState {
    pub archive: Arc<RwLock<Archive<SledStore>>>,
    pub admin_token: Option<String>,
}

pub fn build_app(db_dir: &str, config: &EngineConfig) -> Result<Router> {
    let archive = Archive::new(SledStore::open(db_dir)?, config);
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(router(AppState { archive: Arc::new(RwLock::new(archive)), admin_token }))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/recent", get(recent_handler))
        .route("/suggest", get(suggest_handler))
        .route("/index", post(index_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 100);
    let results = state.archive.read().search(&params.q, k).map_err(internal)?;
    let took_s = start.elapsed().as_secs_f64();
    Ok(Json(SearchResponse { query: params.q, took_s, results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<u32>) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = state.archive.read().document(doc_id).map_err(internal)?;
    match doc {
        Some(doc) => Ok(Json(serde_json::to_value(doc).map_err(|e| internal(e.into()))?)),
        None => Ok(Json(serde_json::json!({ "error": "not found" }))),
    }
}

pub async fn recent_handler(State(state): State<AppState>, Query(params): Query<RecentParams>) -> Result<Json<serde_json::Value>, ApiError> {
    let docs = state.archive.read().recent(params.limit.min(100)).map_err(internal)?;
    let items: Vec<_> = docs
        .into_iter()
        .map(|d| serde_json::json!({ "id": d.id, "url": d.url, "title": d.title, "icon": d.icon }))
        .collect();
    Ok(Json(serde_json::json!({ "results": items })))
}

pub async fn suggest_handler(State(state): State<AppState>, Query(params): Query<SuggestParams>) -> Result<Json<Vec<String>>, ApiError> {
    let words = state.archive.read().suggest(&params.prefix, params.limit.min(100)).map_err(internal)?;
    Ok(Json(words))
}

async fn index_handler(State(state): State<AppState>, headers: HeaderMap, Json(scan): Json<ScanRecord>) -> Result<Json<IndexResponse>, ApiError> {
    authorize(&state, &headers)?;
    if scan.url.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "url is required".into()));
    }
    let report = state.archive.write().index(&scan).map_err(internal)?;
    tracing::info!(url = %scan.url, id = report.id, change = ?report.change, "page indexed");
    Ok(Json(IndexResponse { id: report.id, change: format!("{:?}", report.change).to_lowercase() }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
