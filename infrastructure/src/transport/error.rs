//! Error types for the transport layer

use thiserror::Error;

/// Errors raised while moving frames over a byte channel.
///
/// Every variant is fatal to the session that owns the transport; nothing in
/// this layer retries.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Invalid frame header: {0}")]
    InvalidHeader(String),

    #[error("Transport closed")]
    Closed,
}
