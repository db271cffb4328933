//! # Puente - Receipt Printer Bridge
//!
//! Puente bridges a cloud point-of-sale to the receipt printers on a shop
//! LAN. A POS posts an abstract block document (text, tables, dividers,
//! spacers, images, barcodes) and puente renders and prints it:
//!
//! - **Markup backend**: an HTML page sized to the paper roll, spooled
//!   through the OS print system.
//! - **Commands backend**: an ESC/POS byte stream, spooled raw or written
//!   straight to a device node.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use puente::dispatch::Dispatcher;
//! use puente::document::{Block, Document, PrintOptions, TextBlock};
//! use puente::printer::system::SystemDirectory;
//! use puente::sink::SystemSink;
//!
//! # async fn example() -> Result<(), puente::PrintError> {
//! let dispatcher = Dispatcher::new(
//!     Arc::new(SystemDirectory::new()),
//!     Arc::new(SystemSink::new()),
//! );
//!
//! let mut document = Document::new();
//! document.push(Block::Text(TextBlock::new("Hello")));
//!
//! dispatcher
//!     .print(&document, &PrintOptions::for_printer("TM-T20"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | Block document model and print options |
//! | [`layout`] | Shared font-size and column planning |
//! | [`render`] | Markup and ESC/POS backends |
//! | [`barcode`] | 1D symbology encoding |
//! | [`printer`] | Printer directory and OS enumeration |
//! | [`sink`] | Spooler and device write targets |
//! | [`dispatch`] | Per-printer job serialization |
//! | [`server`] | HTTP bridge API |
//! | [`error`] | Error types |

pub mod barcode;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod layout;
pub mod paper;
pub mod printer;
pub mod render;
pub mod server;
pub mod sink;

// Re-exports for convenience
pub use dispatch::Dispatcher;
pub use document::{Block, Document, PrintOptions};
pub use error::PrintError;
pub use paper::PaperSize;
