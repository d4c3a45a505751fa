//! API Service - upload endpoints for the dispatch records store
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /records/import - strict single-sheet upload, all-or-nothing
//! - POST /records/import/smart - multi-sheet upload, best-effort
//!
//! Authentication lives in front of this service; the authenticated user
//! arrives as an opaque `x-user-id` header and is stamped on every record.

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ingest::{IngestMode, PgRecordStore};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
struct AppState {
    pool: PgPool,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message.into() }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: "0.1.0",
    })
}

/// Pull the uploaded file (filename + bytes) out of the multipart body.
async fn read_upload(multipart: &mut Multipart) -> anyhow::Result<Option<(String, Vec<u8>)>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await?.to_vec();
            return Ok(Some((filename, bytes)));
        }
    }
    Ok(None)
}

async fn import_strict_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    run_import(state, headers, multipart, IngestMode::Strict).await
}

async fn import_smart_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    run_import(state, headers, multipart, IngestMode::Smart).await
}

async fn run_import(
    state: Arc<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
    mode: IngestMode,
) -> Response {
    let actor = match headers.get("x-user-id").and_then(|v| v.to_str().ok()) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return bad_request("missing x-user-id header"),
    };

    let (filename, bytes) = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return bad_request("missing 'file' part in multipart body"),
        Err(e) => return bad_request(format!("failed to read upload: {}", e)),
    };

    let store = PgRecordStore::new(state.pool.clone());
    match ingest::ingest(&filename, &bytes, mode, &actor, &store).await {
        Ok(result) => {
            // A strict upload that rejected its batch reports 400 so the
            // client knows nothing was written; smart uploads report mixed
            // counts with 200.
            let status = if mode == IngestMode::Strict && !result.errors.is_empty() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::OK
            };
            (status, Json(result)).into_response()
        }
        Err(e) => bad_request(e.to_string()),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let db_url = std::env::var("DB_URL").context("DB_URL env var missing")?;
    let bind = std::env::var("API_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    println!("=== Dispatch Records API ===");
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await
        .context("Failed to connect to database")?;

    PgRecordStore::ensure_schema(&pool).await?;
    println!("Database connected");

    let state = Arc::new(AppState { pool });

    // CORS for the web frontend.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/records/import", post(import_strict_handler))
        .route("/records/import/smart", post(import_smart_handler))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
        .layer(cors)
        .with_state(state);

    println!("API listening on http://{}", bind);
    println!("\nEndpoints:");
    println!("  GET  /health");
    println!("  POST /records/import");
    println!("  POST /records/import/smart");

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
