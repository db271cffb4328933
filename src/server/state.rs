//! Server state and configuration.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dispatch::Dispatcher;
use crate::printer::PrinterDirectory;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:9000")
    pub listen_addr: String,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub directory: Arc<dyn PrinterDirectory>,
    pub dispatcher: Dispatcher,
    /// Unix timestamp of server boot, reported by the health endpoint.
    pub boot_time: u64,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        directory: Arc<dyn PrinterDirectory>,
        dispatcher: Dispatcher,
    ) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            config,
            directory,
            dispatcher,
            boot_time,
        }
    }
}
