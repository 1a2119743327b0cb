//! Stream and relay configuration loaded from environment variables.

use std::time::Duration;

/// Event stream tuning with sensible defaults.
///
/// Reads from environment variables:
/// - `STREAM_BUFFER` — queue depth before publishers block (default: `256`)
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub buffer: usize,
}

impl StreamConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            buffer: std::env::var("STREAM_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { buffer: 256 }
    }
}

/// Outbox relay tuning with sensible defaults.
///
/// Reads from environment variables:
/// - `OUTBOX_BATCH_SIZE` — max events drained per tick (default: `100`)
/// - `OUTBOX_POLL_INTERVAL_SECS` — seconds between polls (default: `30`)
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub batch_size: usize,
    pub poll_interval: Duration,
}

impl RelayConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            batch_size: std::env::var("OUTBOX_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            poll_interval: Duration::from_secs(
                std::env::var("OUTBOX_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            poll_interval: Duration::from_secs(30),
        }
    }
}
