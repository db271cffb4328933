//! # Rendering
//!
//! Turns a [`Document`](crate::document::Document) into a backend-specific
//! artifact. Two backends exist:
//!
//! - [`Backend::Markup`]: an HTML page for the OS print-dialog pipeline.
//! - [`Backend::Commands`]: an ESC/POS byte stream for direct device writes.
//!
//! Rendering is pure: option validation happens up front, then blocks are
//! rendered strictly in document order. Barcode encoding failures never
//! surface here; both backends degrade the block to its text value.

pub mod commands;
pub mod markup;

use serde::{Deserialize, Serialize};

use crate::document::{Document, PrintOptions};
use crate::error::PrintError;
use crate::paper::PaperSize;

/// Which renderer a print request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Markup,
    Commands,
}

/// The output of a render, ready for a sink.
#[derive(Debug, Clone)]
pub enum Artifact {
    /// A complete HTML page.
    Markup(String),
    /// A raw ESC/POS command stream.
    Commands(Vec<u8>),
}

impl Artifact {
    /// Byte length of the artifact, for log lines.
    pub fn len(&self) -> usize {
        match self {
            Artifact::Markup(html) => html.len(),
            Artifact::Commands(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render a document with the backend selected in `options`.
///
/// Options are validated first: an unsupported paper size or font scale
/// fails with [`PrintError::InvalidOption`] before any block is touched.
pub fn render_document(document: &Document, options: &PrintOptions) -> Result<Artifact, PrintError> {
    let paper = PaperSize::parse(options.paper_size.as_deref())?;
    let base_px = options.base_font_px()?;
    match options.backend {
        Backend::Markup => Ok(Artifact::Markup(markup::render(document, paper, base_px))),
        Backend::Commands => Ok(Artifact::Commands(commands::render(document, paper, base_px))),
    }
}
