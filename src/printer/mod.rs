//! # Printer Directory
//!
//! Knows which printers exist and validates print targets. The directory is
//! a trait so the server can run against the real OS spooler
//! ([`system::SystemDirectory`]) while tests use a fixed list
//! ([`StaticDirectory`]).

pub mod system;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PrintError;

/// A printer known to the host system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Printer {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub is_default: bool,
    /// Vendor family inferred from the name; informational only.
    pub kind: PrinterKind,
}

impl Printer {
    /// Build a record from a spooler queue name.
    pub fn from_queue_name(name: impl Into<String>, is_default: bool) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            display_name: name.clone(),
            kind: PrinterKind::detect(&name),
            name,
            is_default,
        }
    }
}

/// Vendor family, detected from substrings of the queue name. Anything
/// unrecognized is assumed to speak plain ESC/POS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrinterKind {
    #[serde(rename = "STAR")]
    Star,
    #[serde(rename = "TANCA")]
    Tanca,
    #[serde(rename = "DARUMA")]
    Daruma,
    #[serde(rename = "BEMATECH")]
    Bematech,
    #[serde(rename = "XPrint")]
    XPrint,
    #[default]
    #[serde(rename = "ESC/POS")]
    EscPos,
}

impl PrinterKind {
    /// Wire-format label, also used for CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Star => "STAR",
            Self::Tanca => "TANCA",
            Self::Daruma => "DARUMA",
            Self::Bematech => "BEMATECH",
            Self::XPrint => "XPrint",
            Self::EscPos => "ESC/POS",
        }
    }

    pub fn detect(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("star") {
            Self::Star
        } else if lower.contains("tanca") {
            Self::Tanca
        } else if lower.contains("daruma") {
            Self::Daruma
        } else if lower.contains("bematech") {
            Self::Bematech
        } else if lower.contains("xprint") || lower.contains("xp-") {
            Self::XPrint
        } else {
            Self::EscPos
        }
    }
}

/// Source of truth for which printers exist.
#[async_trait]
pub trait PrinterDirectory: Send + Sync {
    /// Enumerate all known printers.
    async fn printers(&self) -> Result<Vec<Printer>, PrintError>;

    /// Resolve a printer by name, failing with
    /// [`PrintError::PrinterNotFound`] when no queue matches.
    async fn verify(&self, name: &str) -> Result<Printer, PrintError> {
        self.printers()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PrintError::PrinterNotFound(name.to_string()))
    }
}

/// A fixed printer list, for tests and pinned configurations.
pub struct StaticDirectory {
    printers: Vec<Printer>,
}

impl StaticDirectory {
    pub fn new(printers: Vec<Printer>) -> Self {
        Self { printers }
    }
}

#[async_trait]
impl PrinterDirectory for StaticDirectory {
    async fn printers(&self) -> Result<Vec<Printer>, PrintError> {
        Ok(self.printers.clone())
    }
}
