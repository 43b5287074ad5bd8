//! Server state and configuration.

use std::time::Instant;

/// Default cap on request body size (10 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Requests with larger bodies are rejected with 413
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Application state shared across handlers. Read-only after startup.
pub struct AppState {
    pub config: ServerConfig,
    pub started: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
        }
    }
}
