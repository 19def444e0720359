//! Error types for limbsync
//!
//! Steady-state sync never fails. These errors only surface at the edges:
//! parsing inbound payloads, handing frames to the transport and loading
//! configuration. Callers log them and keep ticking.

use thiserror::Error;

use crate::PeerId;

/// Core limbsync errors
#[derive(Error, Debug)]
pub enum SyncError {
    // Wire errors
    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unknown event code: {0:#04x}")]
    UnknownEvent(u8),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Peer {0} is not in the room")]
    PeerNotInRoom(PeerId),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for limbsync operations
pub type SyncResult<T> = Result<T, SyncError>;
