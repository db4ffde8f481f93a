//! Frame Solver HTTP Server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use frame_solver::prelude::*;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<SolveResponse>,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn solve(Json(request): Json<SolveRequest>) -> impl IntoResponse {
    log::debug!(
        "Solve request: {} nodes, {} beams, {} load groups",
        request.model.nodes.len(),
        request.model.beams.len(),
        request.model.loads.len()
    );

    // The solve is CPU bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || request.run()).await;

    match outcome {
        Ok(Ok(results)) => (
            StatusCode::OK,
            Json(AnalysisResponse {
                success: true,
                error: None,
                results: Some(results),
            }),
        ),
        Ok(Err(e)) => {
            let status = match e {
                FrameError::KinematicInstability(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_REQUEST,
            };
            (
                status,
                Json(AnalysisResponse {
                    success: false,
                    error: Some(e.to_string()),
                    results: None,
                }),
            )
        }
        Err(e) => {
            log::error!("Solver task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AnalysisResponse {
                    success: false,
                    error: Some("solver task failed".to_string()),
                    results: None,
                }),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/solve", post(solve))
        .layer(cors);

    let port = std::env::var("FRAME_SOLVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8086);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Frame Solver Server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Solve:        POST /api/v1/solve");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
