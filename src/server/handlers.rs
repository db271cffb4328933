//! JSON API handlers.
//!
//! All responses share the `{"success": ...}` envelope the cloud POS
//! frontend expects. Failures carry the error text plus a machine-readable
//! `kind` tag, with the HTTP status derived from the error taxonomy.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use super::state::AppState;
use crate::document::{Document, PrintOptions, ReceiptData, receipt_to_document};
use crate::error::PrintError;

/// POST /api/print request body.
#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    pub document: Document,
    pub options: PrintOptions,
}

/// POST /api/print/receipt request body, the legacy flat-receipt API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub printer_id: String,
    pub receipt: ReceiptData,
}

fn error_response(err: &PrintError) -> Response {
    let status = match err {
        PrintError::PrinterNotFound(_) => StatusCode::NOT_FOUND,
        PrintError::InvalidOption(_) => StatusCode::BAD_REQUEST,
        PrintError::Dispatch(msg) if msg.starts_with("printer busy") => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({
            "success": false,
            "error": err.to_string(),
            "kind": err.kind(),
        })),
    )
        .into_response()
}

/// Handle GET /health.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    Json(json!({
        "status": "ok",
        "message": "printer bridge is running",
        "bootTime": state.boot_time,
    }))
    .into_response()
}

/// Handle GET /api/printers - enumerate the printer directory.
pub async fn printers(State(state): State<Arc<AppState>>) -> Response {
    match state.directory.printers().await {
        Ok(printers) => Json(json!({
            "success": true,
            "printers": printers,
        }))
        .into_response(),
        Err(err) => error_response(&err),
    }
}

/// Handle POST /api/print - render a block document and dispatch it.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PrintRequest>,
) -> Response {
    match state
        .dispatcher
        .print(&request.document, &request.options)
        .await
    {
        Ok(report) => Json(json!({
            "success": true,
            "message": "Print job sent successfully",
            "jobId": report.job_id,
            "elapsedMs": report.elapsed_ms,
        }))
        .into_response(),
        Err(err) => error_response(&err),
    }
}

/// Handle POST /api/print/receipt - the legacy flat-receipt endpoint.
///
/// Converts the receipt into a block document and sends it through the
/// standard pipeline with default options.
pub async fn print_receipt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReceiptRequest>,
) -> Response {
    let document = receipt_to_document(&request.receipt);
    let options = PrintOptions::for_printer(&request.printer_id);
    match state.dispatcher.print(&document, &options).await {
        Ok(report) => Json(json!({
            "success": true,
            "message": "Print job sent successfully",
            "jobId": report.job_id,
        }))
        .into_response(),
        Err(err) => error_response(&err),
    }
}
