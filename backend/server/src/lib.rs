//! Documentation of Map My Funds, a map of U.S. presidential campaign contributions.
//!
//!
//!
//! # General Infrastructure
//! - A scheduled job pulls contribution totals from OpenFEC and upserts candidate documents in Redis
//! - The HTTP server reads those documents and recomputes every rollup on each request
//! - The frontend only renders, all grouping, ranking and coloring lives in the `rollup` crate
//!
//!
//!
//! # Endpoints
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/api/contributions?year=` | state rollup + candidate directory |
//! | GET | `/api/contributions/withCandidates?year=` | same as above |
//! | GET | `/api/candidates` | candidate directory |
//! | PUT | `/api/candidates/image` | `[{candidate_id, image_url}]` |
//! | GET | `/api/summary?year=&top=` | national ranking + summary bar |
//! | GET | `/api/states?year=` | top states by total, with their candidates |
//! | GET | `/api/map?year=` | per-state fill and tooltip |
//! | POST | `/api/ingest` | start an ingestion pass |
//! | GET | `/api/ingest` | ingestion status |
//!
//! Leaving out `year` merges every election cycle.
//!
//!
//!
//! # Notes
//!
//! ## Ingestion
//! Runs once at start and then every 24 hours by default. Passes never overlap, a manual trigger
//! while one is running gets a 409. A failed pass is logged and left for the next tick.
//!
//! ## Document store
//! `STORE_BACKEND=memory` swaps Redis for an in-process map, handy for local runs.
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! REDIS_URL=redis://127.0.0.1:6379 FEC_API_KEY=... RUST_LOG=info cargo run -p mapmyfunds
//! ```
//!
//! One ingestion pass without the server.
//! ```sh
//! cargo run -p process -- --dry-run
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod utils;

use config::Config;
use error::AppError;
use routes::{
    candidate_images_handler, candidates_handler, contributions_handler, ingest_handler,
    ingest_status_handler, map_handler, states_handler, summary_handler,
};
use state::State;

pub async fn start_server() -> Result<(), AppError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new(Config::load()?).await?;

    state.scheduler.start().await;

    info!("Starting server...");

    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down, waiting for ingestion...");
    state.scheduler.stop().await;

    Ok(())
}

pub fn build_router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/contributions", get(contributions_handler))
        .route("/api/contributions/withCandidates", get(contributions_handler))
        .route("/api/candidates", get(candidates_handler))
        .route("/api/candidates/image", put(candidate_images_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/states", get(states_handler))
        .route("/api/map", get(map_handler))
        .route("/api/ingest", get(ingest_status_handler).post(ingest_handler))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
