//! # HTTP Server
//!
//! The bridge API a cloud POS talks to on the shop LAN.
//!
//! ## Usage
//!
//! ```bash
//! puente serve --listen 0.0.0.0:9000
//! ```
//!
//! Routes:
//!
//! - `GET /health` - liveness probe
//! - `GET /api/printers` - enumerate the printer directory
//! - `POST /api/print` - print a block document
//! - `POST /api/print/receipt` - legacy flat-receipt endpoint
//!
//! CORS is wide open: the caller is a browser-hosted POS on another origin
//! and the server binds to the shop LAN only.

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::dispatch::Dispatcher;
use crate::error::PrintError;
use crate::printer::PrinterDirectory;
use crate::sink::PrintSink;

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/printers", get(handlers::printers))
        .route("/api/print", post(handlers::print))
        .route("/api/print/receipt", post(handlers::print_receipt))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until shutdown.
pub async fn serve(
    config: ServerConfig,
    directory: Arc<dyn PrinterDirectory>,
    sink: Arc<dyn PrintSink>,
) -> Result<(), PrintError> {
    let dispatcher = Dispatcher::new(directory.clone(), sink);
    let state = Arc::new(AppState::new(config.clone(), directory, dispatcher));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(listen = %config.listen_addr, "printer bridge listening");
    axum::serve(listener, app).await?;
    Ok(())
}
