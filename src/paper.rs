//! # Paper Sizes
//!
//! Closed enumeration of supported receipt paper widths.
//!
//! Receipt printers come in a handful of standard roll widths. The selector
//! is a string on the wire (`"80mm"`, `"58mm"`, ...) and maps to a fixed
//! physical millimeter value. An unrecognized selector is a validation
//! error, never a silent default.

use serde::{Deserialize, Serialize};

use crate::error::PrintError;

/// Printable-area margin subtracted from the physical paper width, in mm.
/// Thermal mechanisms cannot print edge to edge.
pub const PAPER_MARGIN_MM: u32 = 8;

/// Pixels per millimeter at the 96 DPI reference used for markup layout.
pub const PX_PER_MM: f32 = 3.78;

/// A supported paper roll width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    #[serde(rename = "80mm")]
    Mm80,
    #[serde(rename = "78mm")]
    Mm78,
    #[serde(rename = "76mm")]
    Mm76,
    #[serde(rename = "58mm")]
    Mm58,
    #[serde(rename = "57mm")]
    Mm57,
    #[serde(rename = "44mm")]
    Mm44,
}

impl PaperSize {
    /// Parse a wire selector (e.g. `"80mm"`).
    ///
    /// `None` selects the default of 80mm. An unrecognized selector fails
    /// with [`PrintError::InvalidOption`].
    pub fn parse(selector: Option<&str>) -> Result<Self, PrintError> {
        match selector {
            None => Ok(Self::default()),
            Some("80mm") => Ok(Self::Mm80),
            Some("78mm") => Ok(Self::Mm78),
            Some("76mm") => Ok(Self::Mm76),
            Some("58mm") => Ok(Self::Mm58),
            Some("57mm") => Ok(Self::Mm57),
            Some("44mm") => Ok(Self::Mm44),
            Some(other) => Err(PrintError::InvalidOption(format!(
                "Unsupported paper size \"{}\" (supported: 80mm, 78mm, 76mm, 58mm, 57mm, 44mm)",
                other
            ))),
        }
    }

    /// Physical paper width in millimeters.
    pub fn width_mm(self) -> u32 {
        match self {
            Self::Mm80 => 80,
            Self::Mm78 => 78,
            Self::Mm76 => 76,
            Self::Mm58 => 58,
            Self::Mm57 => 57,
            Self::Mm44 => 44,
        }
    }

    /// Usable (printable) width in millimeters.
    pub fn printable_mm(self) -> u32 {
        self.width_mm() - PAPER_MARGIN_MM
    }

    /// Usable width in pixels at the 96 DPI markup reference.
    pub fn printable_px(self) -> u32 {
        (self.printable_mm() as f32 * PX_PER_MM).round() as u32
    }

    /// Characters per line in the command-stream backend's base font.
    ///
    /// Standard ESC/POS column counts: 48 for 80mm-class paper, 32 for
    /// 58mm-class, 24 for the narrow 44mm rolls.
    pub fn chars_per_line(self) -> usize {
        match self {
            Self::Mm80 | Self::Mm78 | Self::Mm76 => 48,
            Self::Mm58 | Self::Mm57 => 32,
            Self::Mm44 => 24,
        }
    }
}
