//! # Error Types
//!
//! This module defines error types used throughout the puente library.
//!
//! The taxonomy mirrors the print pipeline's phases: a target printer that
//! cannot be found, options that fail validation, a render that cannot
//! complete, and a sink that rejects or fails the physical job. Barcode
//! encoding failures are deliberately *not* here — they are recovered
//! locally in the renderers with a text fallback and never reach a caller.

use thiserror::Error;

/// Main error type for print operations.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The requested printer is not known to the printer directory.
    #[error("Printer not found: {0}")]
    PrinterNotFound(String),

    /// Unsupported paper size or malformed option value.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Unexpected failure while building the render artifact.
    #[error("Render error: {0}")]
    Render(String),

    /// The backend sink rejected or failed the physical job.
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// I/O error wrapper.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrintError {
    /// Machine-readable kind tag, used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            PrintError::PrinterNotFound(_) => "printer_not_found",
            PrintError::InvalidOption(_) => "invalid_option",
            PrintError::Render(_) => "render_error",
            PrintError::Dispatch(_) => "dispatch_error",
            PrintError::Io(_) => "io_error",
        }
    }
}
