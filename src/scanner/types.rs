// Core types for the scan session

use chrono::{DateTime, Utc};
use thiserror::Error;

/// One successfully decoded QR payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub data: String,
    pub decoded_at: DateTime<Utc>,
}

impl DecodedPayload {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            decoded_at: Utc::now(),
        }
    }
}

/// Events delivered by the decoder collaborator over its channel.
///
/// Decode failures arrive on the same channel as payloads rather than as
/// `Err` values: a frame that fails to decode is a diagnostic, not a
/// reason to stop the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    Decoded(DecodedPayload),
    DecodeError(String),
}

/// Capture-layer failures. All of these abort the current attempt to open
/// a session; none of them are retried automatically.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no camera found on this device")]
    NoCamera,
    #[error("failed to open the camera: {0}")]
    CameraAccess(String),
    #[error("scan session is already running")]
    AlreadyRunning,
    #[error("scan session was disposed")]
    Disposed,
}
