//! # Puente CLI
//!
//! ## Usage
//!
//! ```bash
//! # Run the bridge server
//! puente serve --listen 0.0.0.0:9000
//!
//! # List printers known to the OS
//! puente printers
//!
//! # Print a document JSON file through the spooler
//! puente print --printer TM-T20 receipt.json
//!
//! # Print straight to a device node with the ESC/POS backend
//! puente print --printer TM-T20 --device /dev/usb/lp0 receipt.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use puente::document::{Document, PrintOptions};
use puente::error::PrintError;
use puente::printer::system::SystemDirectory;
use puente::printer::PrinterDirectory;
use puente::render::Backend;
use puente::server::{self, ServerConfig};
use puente::sink::{DeviceSink, PrintSink, SystemSink};
use puente::Dispatcher;

/// Puente - receipt printer bridge
#[derive(Parser, Debug)]
#[command(name = "puente")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP bridge server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:9000")]
        listen: String,
    },

    /// List printers known to the OS spooler
    Printers,

    /// Print a document JSON file
    Print {
        /// Document file ("-" reads stdin)
        file: PathBuf,

        /// Target printer name
        #[arg(long)]
        printer: String,

        /// Paper size selector (80mm, 78mm, 76mm, 58mm, 57mm, 44mm)
        #[arg(long)]
        paper: Option<String>,

        /// Use the ESC/POS commands backend instead of markup
        #[arg(long)]
        commands: bool,

        /// Write straight to a device node (implies the commands backend)
        #[arg(long, value_name = "PATH")]
        device: Option<PathBuf>,

        /// Number of copies
        #[arg(long)]
        copies: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PrintError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { listen } => {
            server::serve(
                ServerConfig {
                    listen_addr: listen,
                },
                Arc::new(SystemDirectory::new()),
                Arc::new(SystemSink::new()),
            )
            .await
        }

        Commands::Printers => {
            let directory = SystemDirectory::new();
            let printers = directory.printers().await?;
            if printers.is_empty() {
                println!("No printers found.");
                return Ok(());
            }
            for printer in printers {
                let default_marker = if printer.is_default { " (default)" } else { "" };
                println!("{}  [{}]{}", printer.name, printer.kind.label(), default_marker);
            }
            Ok(())
        }

        Commands::Print {
            file,
            printer,
            paper,
            commands,
            device,
            copies,
        } => {
            let json = if file.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                std::fs::read_to_string(&file)?
            };
            let document: Document = serde_json::from_str(&json)
                .map_err(|e| PrintError::InvalidOption(format!("bad document: {}", e)))?;

            let mut options = PrintOptions::for_printer(printer);
            options.paper_size = paper;
            options.copies = copies;
            if commands || device.is_some() {
                options.backend = Backend::Commands;
            }

            let sink: Arc<dyn PrintSink> = match device {
                Some(path) => Arc::new(DeviceSink::new(path)),
                None => Arc::new(SystemSink::new()),
            };
            let dispatcher = Dispatcher::new(Arc::new(SystemDirectory::new()), sink);
            let report = dispatcher.print(&document, &options).await?;
            println!(
                "Printed job {} to {} ({} bytes, {} ms)",
                report.job_id, report.printer, report.artifact_bytes, report.elapsed_ms
            );
            Ok(())
        }
    }
}
