//! OS spooler enumeration.
//!
//! CUPS platforms are listed with `lpstat -p -d`; Windows with
//! `wmic printer get name,default /format:csv`. Parsing is split out as
//! pure functions over captured output so it stays testable without a
//! spooler.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Printer, PrinterDirectory};
use crate::error::PrintError;

/// Directory backed by the host print spooler.
#[derive(Debug, Default)]
pub struct SystemDirectory;

impl SystemDirectory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PrinterDirectory for SystemDirectory {
    async fn printers(&self) -> Result<Vec<Printer>, PrintError> {
        let output = if cfg!(windows) {
            Command::new("wmic")
                .args(["printer", "get", "name,default", "/format:csv"])
                .output()
                .await?
        } else {
            Command::new("lpstat").args(["-p", "-d"]).output().await?
        };
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(bytes = stdout.len(), "spooler enumeration output");
        let printers = if cfg!(windows) {
            parse_wmic(&stdout)
        } else {
            parse_lpstat(&stdout)
        };
        Ok(printers)
    }
}

/// Parse `lpstat -p -d` output.
///
/// Queue lines look like `printer TM-T20 is idle.  enabled since ...`;
/// the default is announced as `system default destination: TM-T20`.
pub fn parse_lpstat(output: &str) -> Vec<Printer> {
    let default = output
        .lines()
        .find_map(|line| line.strip_prefix("system default destination:"))
        .map(str::trim)
        .unwrap_or("");

    output
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix("printer ")?;
            let name = rest.split_whitespace().next()?;
            Some(Printer::from_queue_name(name, name == default))
        })
        .collect()
}

/// Parse `wmic printer get name,default /format:csv` output.
///
/// CSV columns are `Node,Default,Name`; the first non-blank line is the
/// header.
pub fn parse_wmic(output: &str) -> Vec<Printer> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() < 3 {
                return None;
            }
            let is_default = parts[1].trim().eq_ignore_ascii_case("TRUE");
            let name = parts[2].trim();
            if name.is_empty() {
                return None;
            }
            Some(Printer::from_queue_name(name, is_default))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PrinterKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_lpstat_with_default() {
        let output = "\
printer TM-T20 is idle.  enabled since Mon 01 Jan 2026
printer Star_TSP100 is idle.  enabled since Mon 01 Jan 2026
system default destination: TM-T20
";
        let printers = parse_lpstat(output);
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[0].name, "TM-T20");
        assert!(printers[0].is_default);
        assert!(!printers[1].is_default);
        assert_eq!(printers[1].kind, PrinterKind::Star);
    }

    #[test]
    fn test_parse_lpstat_no_default() {
        let output = "\
printer TM-T20 is idle.  enabled since Mon 01 Jan 2026
no system default destination
";
        let printers = parse_lpstat(output);
        assert_eq!(printers.len(), 1);
        assert!(!printers[0].is_default);
    }

    #[test]
    fn test_parse_lpstat_empty() {
        assert!(parse_lpstat("").is_empty());
        assert!(parse_lpstat("lpstat: No destinations added.\n").is_empty());
    }

    #[test]
    fn test_parse_wmic() {
        let output = "\
Node,Default,Name
DESKTOP-1,TRUE,EPSON TM-T20
DESKTOP-1,FALSE,Microsoft Print to PDF
";
        let printers = parse_wmic(output);
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[0].name, "EPSON TM-T20");
        assert!(printers[0].is_default);
        assert!(!printers[1].is_default);
    }

    #[test]
    fn test_parse_wmic_skips_malformed_lines() {
        let output = "Node,Default,Name\ngarbage\nDESKTOP-1,FALSE,\n";
        assert!(parse_wmic(output).is_empty());
    }
}
