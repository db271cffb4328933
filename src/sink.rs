//! # Print Sinks
//!
//! A sink takes a rendered artifact and gets it onto paper. Two live
//! implementations:
//!
//! - [`SystemSink`]: spools through the OS print system (`lp`). Markup goes
//!   through the normal driver pipeline; command streams are spooled raw so
//!   the driver passes bytes through untouched. Spooling never raises a
//!   print dialog, whatever the request's `silent` flag says.
//! - [`DeviceSink`]: writes a command stream straight to a character device
//!   such as `/dev/usb/lp0`, chunked so the printer's buffer keeps up.
//!
//! A failed device write leaves the mechanism mid-job, so [`DeviceSink`]
//! finishes with a best-effort initialize, feed and cut before reporting
//! the error.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::document::PrintOptions;
use crate::error::PrintError;
use crate::printer::Printer;
use crate::render::Artifact;

/// Chunk size for direct device writes, in bytes.
const CHUNK_SIZE: usize = 4096;

/// Pause between chunks so a slow serial link does not overflow.
const CHUNK_DELAY_MS: u64 = 2;

/// Best-effort tail after a failed write: initialize, feed 4 lines,
/// partial cut.
const RESET_TAIL: &[u8] = &[0x1B, b'@', 0x1B, b'd', 4, 0x1D, b'V', 66, 3];

/// Something that can take a rendered artifact to paper.
#[async_trait]
pub trait PrintSink: Send + Sync {
    async fn dispatch(
        &self,
        printer: &Printer,
        artifact: &Artifact,
        options: &PrintOptions,
    ) -> Result<(), PrintError>;
}

/// Spool through the OS print system.
#[derive(Debug, Default)]
pub struct SystemSink;

impl SystemSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PrintSink for SystemSink {
    async fn dispatch(
        &self,
        printer: &Printer,
        artifact: &Artifact,
        options: &PrintOptions,
    ) -> Result<(), PrintError> {
        match artifact {
            Artifact::Markup(html) => {
                spool(&printer.id, html.as_bytes(), options.copies(), false).await
            }
            Artifact::Commands(bytes) => spool(&printer.id, bytes, options.copies(), true).await,
        }
    }
}

/// Write the payload to a temp file and hand it to `lp`. The `raw` flag
/// bypasses the driver for command streams.
async fn spool(printer_id: &str, payload: &[u8], copies: u32, raw: bool) -> Result<(), PrintError> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(payload)?;
    file.flush()?;

    let copies_arg = copies.to_string();
    let mut cmd = Command::new("lp");
    cmd.args(["-d", printer_id, "-n", &copies_arg]);
    if raw {
        cmd.args(["-o", "raw"]);
    }
    cmd.arg(file.path());

    debug!(printer = printer_id, bytes = payload.len(), raw, "spooling via lp");
    let output = cmd.output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PrintError::Dispatch(format!(
            "lp failed for {}: {}",
            printer_id,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Write a command stream straight to a printer device node.
#[derive(Debug, Clone)]
pub struct DeviceSink {
    device: PathBuf,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl DeviceSink {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        }
    }

    /// Blocking write with chunking. Runs on a blocking thread when called
    /// through [`PrintSink::dispatch`].
    pub fn write_stream(&self, bytes: &[u8]) -> Result<(), PrintError> {
        let mut file = OpenOptions::new().write(true).open(&self.device)?;
        let result = self.write_chunked(&mut file, bytes);
        if result.is_err() {
            // The job is lost either way; leave the printer usable.
            warn!(device = %self.device.display(), "write failed, sending reset tail");
            let _ = file.write_all(RESET_TAIL);
            let _ = file.flush();
        }
        result
    }

    fn write_chunked(&self, file: &mut std::fs::File, bytes: &[u8]) -> Result<(), PrintError> {
        for chunk in bytes.chunks(self.chunk_size.max(1)) {
            file.write_all(chunk)?;
            if !self.chunk_delay.is_zero() && bytes.len() > self.chunk_size {
                std::thread::sleep(self.chunk_delay);
            }
        }
        file.flush()?;
        Ok(())
    }
}

#[async_trait]
impl PrintSink for DeviceSink {
    async fn dispatch(
        &self,
        _printer: &Printer,
        artifact: &Artifact,
        _options: &PrintOptions,
    ) -> Result<(), PrintError> {
        let Artifact::Commands(bytes) = artifact else {
            return Err(PrintError::Dispatch(
                "device sink requires the commands backend".to_string(),
            ));
        };
        let sink = self.clone();
        let bytes = bytes.clone();
        tokio::task::spawn_blocking(move || sink.write_stream(&bytes))
            .await
            .map_err(|e| PrintError::Dispatch(format!("device write task failed: {}", e)))?
    }
}
