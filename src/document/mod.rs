//! # Block Document Model
//!
//! A single type hierarchy that is both the Rust API and the JSON API.
//! `Document` is constructible in Rust and deserializable from JSON.
//!
//! ```ignore
//! use puente::document::*;
//!
//! // Rust construction
//! let doc = Document {
//!     blocks: vec![
//!         Block::Text(TextBlock::new("Hello")),
//!         Block::Divider(DividerBlock::default()),
//!     ],
//! };
//!
//! // JSON deserialization (wire format matches the POS bridge protocol)
//! let doc: Document = serde_json::from_str(
//!     r#"{"blocks":[{"type":"text","value":"Hello"}]}"#,
//! ).unwrap();
//! ```
//!
//! A document is an ordered sequence of blocks; order is rendering order and
//! the only structural signal. Documents are constructed once, rendered, and
//! discarded — none outlives a single print request.

pub mod convert;

pub use convert::{LineItem, ReceiptData, receipt_to_document};

use serde::{Deserialize, Serialize};

use crate::barcode::Symbology;
use crate::render::Backend;

/// A printable document: an ordered sequence of blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block to the document.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }
}

/// One unit of printable content.
///
/// A closed tagged union — renderers match exhaustively, and new block kinds
/// are a reviewed extension, not a runtime plugin point. The `type` tag
/// enables JSON like `{"type": "text", "value": "Hello"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text(TextBlock),
    Table(TableBlock),
    Divider(DividerBlock),
    Spacer(SpacerBlock),
    Image(ImageBlock),
    Barcode(BarcodeBlock),
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Divider line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    #[default]
    Dashed,
    Dotted,
}

// ============================================================================
// TEXT
// ============================================================================

/// Free-form text. Embedded newlines become explicit line breaks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBlock {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
}

impl TextBlock {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            style: None,
        }
    }

    pub fn styled(value: impl Into<String>, style: TextStyle) -> Self {
        Self {
            value: value.into(),
            style: Some(style),
        }
    }
}

/// Style overrides for a text block.
///
/// Font sizing follows a strict precedence chain, resolved by
/// [`crate::layout::style::resolve_font_size`]: an explicit `font_size`
/// (scaled by the block's own `font_scale` if present) beats `font_scale`
/// applied to the document base, which beats the document base alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u32>,
}

// ============================================================================
// TABLE
// ============================================================================

/// One table row: either an ordered list of cells, or a single string that
/// spans the full width of the table (all columns).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Row {
    /// A full-width row, rendered with the table's full-width align/bold
    /// policy and never split into columns.
    FullWidth(String),
    /// A normal row of per-column cells.
    Cells(Vec<String>),
}

/// Tabular data with optional headers and per-column styling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TableStyle>,
}

fn default_true() -> bool {
    true
}

/// Style overrides for a table block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_align: Option<Align>,
    /// Alignment per column; columns beyond the list default per context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_aligns: Option<Vec<Align>>,
    /// Bold per column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_bolds: Option<Vec<bool>>,
    /// Whether the header row is bold. Default: true.
    #[serde(default = "default_true")]
    pub header_bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u32>,
    /// Alignment for full-width rows. Default: left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_width_row_align: Option<Align>,
    /// Bold for full-width rows. Default: false.
    #[serde(default)]
    pub full_width_row_bold: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_align: None,
            column_aligns: None,
            column_bolds: None,
            header_bold: true,
            font_size: None,
            font_scale: None,
            margin_top: None,
            margin_bottom: None,
            full_width_row_align: None,
            full_width_row_bold: false,
        }
    }
}

impl TableBlock {
    /// Number of columns: header count if present, otherwise the widest
    /// cell row (full-width rows don't participate).
    pub fn column_count(&self) -> usize {
        if let Some(headers) = &self.headers {
            if !headers.is_empty() {
                return headers.len();
            }
        }
        self.rows
            .iter()
            .filter_map(|row| match row {
                Row::Cells(cells) => Some(cells.len()),
                Row::FullWidth(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// DIVIDER / SPACER
// ============================================================================

/// A horizontal rule separating sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DividerBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<DividerStyle>,
}

/// Style overrides for a divider. The default top margin is a small positive
/// constant so adjacent sections read as visually separate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividerStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
}

/// Vertical whitespace, in device-independent pixels. Default: 10.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpacerBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

// ============================================================================
// IMAGE
// ============================================================================

/// An image from a URL or `data:` blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageBlock {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,
}

/// Style overrides for an image block. With no explicit dimensions the image
/// renders at intrinsic size constrained to the paper's printable width.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u32>,
}

// ============================================================================
// BARCODE
// ============================================================================

/// A 1D barcode. The value is encoded with the selected symbology; when the
/// encoder cannot produce a raster the literal value is rendered as text
/// instead — a print never aborts because of a barcode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeBlock {
    pub value: String,
    /// Symbology. Default: CODE128.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_type: Option<Symbology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<BarcodeStyle>,
}

/// Style overrides for a barcode block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Bar height in pixels. Default: 50.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Show the encoded value as text beneath the bars. Default: true.
    #[serde(default = "default_true")]
    pub display_value: bool,
    /// Font size for the value text. Default: 12.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u32>,
}

impl Default for BarcodeStyle {
    fn default() -> Self {
        Self {
            align: None,
            width: None,
            height: None,
            display_value: true,
            font_size: None,
            margin_top: None,
            margin_bottom: None,
        }
    }
}

// ============================================================================
// PRINT OPTIONS
// ============================================================================

/// Options accompanying a print request.
///
/// `paper_size` stays a wire selector string here; it is validated against
/// the closed [`crate::paper::PaperSize`] enumeration as the first step of
/// rendering, so an unsupported selector fails before any block is rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
    /// Target printer identifier, validated against the printer directory.
    pub printer_name: String,
    /// Paper width selector (e.g. "80mm"). Default: "80mm".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<String>,
    /// Base font size in pixels. Default: 12.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    /// Document-wide scale multiplier. Default: 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f32>,
    /// Copy count for the dialog pipeline. Default: 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies: Option<u32>,
    /// Accepted for wire compatibility with clients that could toggle a
    /// print dialog. The spooler pipeline here is always dialog-free, so
    /// the flag has no effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
    /// Which rendering backend to use. Default: markup.
    #[serde(default)]
    pub backend: Backend,
}

impl PrintOptions {
    /// Options targeting a named printer, everything else defaulted.
    pub fn for_printer(printer_name: impl Into<String>) -> Self {
        Self {
            printer_name: printer_name.into(),
            paper_size: None,
            font_size: None,
            font_scale: None,
            copies: None,
            silent: None,
            backend: Backend::default(),
        }
    }

    /// Effective base font size: `round(font_size × font_scale)`.
    ///
    /// Fails with [`PrintError::InvalidOption`] for a non-positive or
    /// non-finite scale.
    pub fn base_font_px(&self) -> Result<u32, crate::error::PrintError> {
        let scale = self.font_scale.unwrap_or(1.0);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(crate::error::PrintError::InvalidOption(format!(
                "Invalid font scale: {}",
                scale
            )));
        }
        Ok((self.font_size.unwrap_or(12) as f32 * scale).round() as u32)
    }

    /// Copy count, at least 1.
    pub fn copies(&self) -> u32 {
        self.copies.unwrap_or(1).max(1)
    }
}
