use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use rect_packer::packer::{AttemptSummary, SearchOutcome};
use rect_packer::types::{NamedRect, Placement};
use rect_packer::{Packer, SearchConfig, config::DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct PackRequest {
    rects: Vec<NamedRect>,
    #[serde(default = "default_max_attempts")]
    max_attempts: usize,
    #[serde(default)]
    time_limit_ms: Option<u64>,
}

const MAX_ATTEMPTS_CAP: usize = DEFAULT_MAX_ATTEMPTS;
const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(5);
const MAX_TIME_LIMIT: Duration = Duration::from_secs(30);

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

/// Request limits clamped to what one request may spend.
fn search_config(req: &PackRequest) -> SearchConfig {
    let time_limit = req
        .time_limit_ms
        .map_or(DEFAULT_TIME_LIMIT, Duration::from_millis)
        .min(MAX_TIME_LIMIT);
    SearchConfig::new()
        .with_max_attempts(req.max_attempts.min(MAX_ATTEMPTS_CAP))
        .with_time_limit(time_limit)
}

#[derive(Serialize)]
struct PackResponse {
    outcome: SearchOutcome,
    width: u32,
    height: u32,
    placements: Vec<Placement>,
    waste_percent: f64,
    attempts: Vec<AttemptSummary>,
}

async fn pack(Json(req): Json<PackRequest>) -> Result<Json<PackResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /pack"
    );

    let config = search_config(&req);
    let packer =
        Packer::new(req.rects, config).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let report = tokio::task::spawn_blocking(move || packer.solve())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let Some(best) = report.best else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            report.outcome.to_string(),
        ));
    };

    let response = PackResponse {
        outcome: report.outcome,
        width: best.width,
        height: best.height,
        waste_percent: best.waste_percent(),
        placements: best.placements,
        attempts: report.history,
    };

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    // DSN comes from SENTRY_DSN; reporting stays off when it is unset.
    let _sentry = sentry::init(sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/pack", post(pack))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
