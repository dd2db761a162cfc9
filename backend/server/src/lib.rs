//! Documentation of the CTF submission backend.
//!
//! # General Infrastructure
//! - The landing site posts flag submissions to this server
//! - Each accepted submission is rendered into an email and handed to the
//!   configured SMTP relay
//! - Handling is stateless and request-scoped: a fresh SMTP connection is
//!   opened and verified per request, no pooling across requests
//! - Two concurrent submissions are fully independent
//!
//! # Never Losing A Submission
//!
//! **Goal**: a delivery failure must never silently drop a submission.
//!
//! - If the SMTP relay is unconfigured or unreachable, the full payload is
//!   written to the server log for manual recovery
//! - The caller only ever sees a generic message; which variable is
//!   missing or what the transport said stays server-side
//! - No retries. Recovery is manual, via the logs.
//!
//! # Routes
//! - `POST /api/submit-flags`: 200 `{message, messageId}` on delivery,
//!   400 `{error}` when the name is missing, 500 `{error}` otherwise
//! - `GET /api/csrf-token`: advisory delivery token, 64 hex chars plus an
//!   expiry one hour out
//!
//! # Setup
//!
//! Required for delivery: `SMTP_HOST`, `SMTP_USER`, `SMTP_PASSWORD`.
//! Optional: `SMTP_PORT` (587, implicit TLS when 465), `SUBMISSION_EMAIL`,
//! `RUST_PORT`.
//!
//! Run locally without a relay to exercise the fallback path:
//! ```sh
//! RUST_LOG=info cargo run -p server
//! ```
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{get, post},
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
pub mod mailer;
pub mod message;
pub mod routes;
pub mod state;

use routes::{csrf_token_handler, submit_handler};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading configuration...");
    let state = AppState::new();

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-csrf-token")])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/api/submit-flags", post(submit_handler))
        .route("/api/csrf-token", get(csrf_token_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
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
