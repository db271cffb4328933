//! # Barcode Encoding
//!
//! 1D symbology encoding shared by both rendering backends.
//!
//! Encoding produces a module sequence (1 = bar, 0 = space) which the
//! backends rasterize however suits them. Encoding can fail — a value that
//! doesn't fit the symbology, or a symbology we accept on the wire but have
//! no encoder for — and the failure is *recoverable by contract*: renderers
//! fall back to printing the literal value as text, and a print job never
//! aborts because of a barcode.

use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean13::{EAN13, UPCA};
use barcoders::sym::ean8::EAN8;
use barcoders::sym::tf::TF;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported barcode symbologies.
///
/// Wire names follow the conventional uppercase spellings ("CODE128",
/// "EAN13", ...) with "pharmacode" as the historical lowercase exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Symbology {
    #[default]
    #[serde(rename = "CODE128")]
    Code128,
    #[serde(rename = "EAN13")]
    Ean13,
    #[serde(rename = "EAN8")]
    Ean8,
    #[serde(rename = "UPC")]
    Upc,
    #[serde(rename = "CODE39")]
    Code39,
    #[serde(rename = "ITF14")]
    Itf14,
    #[serde(rename = "MSI")]
    Msi,
    #[serde(rename = "pharmacode")]
    Pharmacode,
}

impl Symbology {
    /// Human-readable name for log lines and fallback messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Code128 => "CODE128",
            Self::Ean13 => "EAN13",
            Self::Ean8 => "EAN8",
            Self::Upc => "UPC",
            Self::Code39 => "CODE39",
            Self::Itf14 => "ITF14",
            Self::Msi => "MSI",
            Self::Pharmacode => "pharmacode",
        }
    }
}

/// Why a value could not be encoded. Renderers recover with a text fallback.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value violates the symbology's character set or length rules.
    #[error("value {value:?} is not valid {symbology}")]
    InvalidValue {
        symbology: &'static str,
        value: String,
    },
    /// The symbology is accepted on the wire but has no encoder here.
    #[error("no encoder for {0}")]
    Unsupported(&'static str),
}

/// Encode a value into a module sequence: 1 = bar, 0 = space.
pub fn encode(symbology: Symbology, value: &str) -> Result<Vec<u8>, EncodeError> {
    let invalid = |_| EncodeError::InvalidValue {
        symbology: symbology.name(),
        value: value.to_string(),
    };
    match symbology {
        Symbology::Code128 => {
            // Code128 needs a character set prefix; Set B covers the full
            // printable ASCII range.
            let prefixed = format!("\u{0181}{}", value);
            Ok(Code128::new(&prefixed).map_err(invalid)?.encode())
        }
        Symbology::Ean13 => Ok(EAN13::new(value).map_err(invalid)?.encode()),
        Symbology::Ean8 => Ok(EAN8::new(value).map_err(invalid)?.encode()),
        Symbology::Upc => Ok(UPCA::new(value).map_err(invalid)?.encode()),
        Symbology::Code39 => Ok(Code39::new(value).map_err(invalid)?.encode()),
        Symbology::Itf14 => Ok(TF::interleaved(value).map_err(invalid)?.encode()),
        Symbology::Msi => Err(EncodeError::Unsupported("MSI")),
        Symbology::Pharmacode => Err(EncodeError::Unsupported("pharmacode")),
    }
}

/// Rasterize a module sequence into a grayscale image of black bars on
/// white, at most `max_width` pixels wide.
///
/// Each module gets an integral pixel width of at least 1, so very long
/// codes on narrow paper can exceed `max_width` rather than vanish; the
/// caller decides whether to scale down at the device level.
pub fn rasterize(modules: &[u8], max_width: u32, height: u32) -> GrayImage {
    let module_px = (max_width / modules.len().max(1) as u32).max(1);
    let width = module_px * modules.len().max(1) as u32;
    let mut img = GrayImage::from_pixel(width, height.max(1), Luma([255u8]));
    for (i, &module) in modules.iter().enumerate() {
        if module == 1 {
            for dx in 0..module_px {
                let x = i as u32 * module_px + dx;
                for y in 0..img.height() {
                    img.put_pixel(x, y, Luma([0u8]));
                }
            }
        }
    }
    img
}
