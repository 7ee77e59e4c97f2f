// Decoder collaborator seam - separating camera plumbing for testability

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::scanner::types::{DecodeEvent, ScanError};

/// External QR decoding session.
///
/// Implementations own the capture device and push decode events over the
/// channel returned by `open`. The session controller consumes one event
/// at a time, so rapid repeated frames of the same code cannot trigger
/// overlapping validations.
#[async_trait]
pub trait QrDecoder: Send {
    /// Probe whether any capture device is available at all.
    async fn has_camera(&self) -> Result<bool, ScanError>;

    /// Open the capture device and start producing decode events.
    ///
    /// Fails with `CameraAccess` when the device exists but cannot be
    /// opened (permissions, already in use). The returned receiver yields
    /// events until `close` or `dispose`.
    async fn open(&mut self) -> Result<mpsc::Receiver<DecodeEvent>, ScanError>;

    /// Suspend frame decoding without releasing the device.
    async fn pause(&mut self);

    /// Resume decoding after `pause`.
    async fn resume(&mut self);

    /// Stop decoding and release the device. The decoder may be opened again.
    async fn close(&mut self);

    /// Release the underlying capture session permanently. Idempotent;
    /// called on every teardown path.
    fn dispose(&mut self);
}
