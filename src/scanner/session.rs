// Scan session controller.
//
// Owns the decoder collaborator for the lifetime of one operator-facing
// scanning view, drives the scan state machine, and forwards accepted
// payloads into the validation workflow. Decode events are consumed one
// at a time off the decoder channel, so a burst of frames showing the
// same code cannot start overlapping validations.

use statig::prelude::*;
use tracing::{debug, warn};

use crate::config::ScannerConfig;
use crate::scanner::state_machine::{ScanEvent, ScanStateMachine, State};
use crate::scanner::traits::QrDecoder;
use crate::scanner::types::{DecodeEvent, ScanError};
use crate::store::OrderStore;
use crate::validation::{ValidatedOrder, ValidationError, ValidationWorkflow};

use tokio::sync::mpsc;

/// What the session driver got out of one turn of the decode loop.
#[derive(Debug)]
pub enum ScanTurn {
    /// A payload was decoded and validated immediately (confirmation off).
    Validated(Result<ValidatedOrder, ValidationError>),
    /// A payload was decoded and is waiting for the operator's decision.
    NeedsConfirmation(String),
    /// The decoder channel closed; the session is back in idle.
    Closed,
}

pub struct ScanSession<S: OrderStore> {
    machine: StateMachine<ScanStateMachine>,
    decoder: Box<dyn QrDecoder>,
    workflow: ValidationWorkflow<S>,
    config: ScannerConfig,
    events: Option<mpsc::Receiver<DecodeEvent>>,
    pending: Option<String>,
    disposed: bool,
}

impl<S: OrderStore> ScanSession<S> {
    pub fn new(
        decoder: Box<dyn QrDecoder>,
        workflow: ValidationWorkflow<S>,
        config: ScannerConfig,
    ) -> Self {
        let machine = ScanStateMachine::new(config.confirm_before_validate).state_machine();
        Self {
            machine,
            decoder,
            workflow,
            config,
            events: None,
            pending: None,
            disposed: false,
        }
    }

    pub fn state(&self) -> State {
        self.machine.state().clone()
    }

    pub fn pending_payload(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Probe the capture device and begin scanning.
    ///
    /// `NoCamera` and `CameraAccess` leave the session idle; the operator
    /// re-opens the scanning view to try again.
    pub async fn start(&mut self) -> Result<(), ScanError> {
        if self.disposed {
            return Err(ScanError::Disposed);
        }
        if self.events.is_some() {
            return Err(ScanError::AlreadyRunning);
        }
        if !self.decoder.has_camera().await? {
            return Err(ScanError::NoCamera);
        }
        let receiver = self.decoder.open().await?;
        self.events = Some(receiver);
        self.machine.handle(&ScanEvent::SessionOpened);
        Ok(())
    }

    /// Consume decode events until one produces a turn.
    ///
    /// Per-frame decode errors are logged and skipped; they never end the
    /// session. With confirmation enabled the decoder is paused while the
    /// operator decides, so no further frames are consumed until
    /// `confirm` or `decline`.
    pub async fn next_turn(&mut self) -> ScanTurn {
        loop {
            let event = match self.events.as_mut() {
                Some(receiver) => receiver.recv().await,
                None => return ScanTurn::Closed,
            };
            match event {
                None => {
                    self.stop().await;
                    return ScanTurn::Closed;
                }
                Some(DecodeEvent::DecodeError(message)) => {
                    warn!(error = %message, "frame failed to decode");
                }
                Some(DecodeEvent::Decoded(payload)) => {
                    self.machine.handle(&ScanEvent::PayloadDecoded {
                        data: payload.data.clone(),
                    });
                    self.pending = Some(payload.data.clone());
                    if self.config.confirm_before_validate {
                        self.decoder.pause().await;
                        return ScanTurn::NeedsConfirmation(payload.data);
                    }
                    return ScanTurn::Validated(self.validate_pending().await);
                }
            }
        }
    }

    /// Validate the payload the operator just accepted.
    ///
    /// Returns `None` when nothing is pending, which means the caller is
    /// confirming out of turn.
    pub async fn confirm(&mut self) -> Option<Result<ValidatedOrder, ValidationError>> {
        if self.pending.is_none() {
            warn!("confirm called with no pending payload");
            return None;
        }
        self.machine.handle(&ScanEvent::Confirmed);
        Some(self.validate_pending().await)
    }

    /// Discard the pending payload and resume scanning.
    pub async fn decline(&mut self) {
        if self.pending.take().is_none() {
            return;
        }
        debug!("pending payload declined by operator");
        self.machine.handle(&ScanEvent::Declined);
        self.decoder.resume().await;
    }

    /// Receive the next decoder event as a raw line, without driving the
    /// scan flow. Line-oriented front ends use this to collect the
    /// operator's confirmation answer from the same input stream.
    pub async fn next_raw_payload(&mut self) -> Option<String> {
        let receiver = self.events.as_mut()?;
        loop {
            match receiver.recv().await? {
                DecodeEvent::Decoded(payload) => return Some(payload.data),
                DecodeEvent::DecodeError(message) => {
                    warn!(error = %message, "frame failed to decode");
                }
            }
        }
    }

    /// Suspend frame decoding without ending the session.
    pub async fn pause(&mut self) {
        if self.events.is_some() {
            self.decoder.pause().await;
        }
    }

    /// Resume a paused session.
    pub async fn resume(&mut self) {
        if self.events.is_some() {
            self.decoder.resume().await;
        }
    }

    /// Return to idle. Safe to call when already idle.
    pub async fn stop(&mut self) {
        self.pending = None;
        if self.events.take().is_some() {
            self.decoder.close().await;
        }
        self.machine.handle(&ScanEvent::Stopped);
    }

    /// Release the capture session permanently. Idempotent, and also run
    /// from `Drop` so the camera handle cannot leak on any teardown path.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.pending = None;
        self.events = None;
        self.decoder.dispose();
        self.machine.handle(&ScanEvent::Stopped);
    }

    async fn validate_pending(&mut self) -> Result<ValidatedOrder, ValidationError> {
        // pending is always set by the caller paths
        let data = self.pending.take().unwrap_or_default();
        let result = self.workflow.validate(&data).await;
        self.machine.handle(&ScanEvent::ValidationFinished);
        if self.config.continuous_scan {
            if self.config.confirm_before_validate {
                // The decoder was paused while the operator decided.
                self.decoder.resume().await;
            }
            self.machine.handle(&ScanEvent::Dismissed);
        } else {
            // Single-shot: one decode per session unless explicitly restarted.
            self.stop().await;
        }
        result
    }
}

impl<S: OrderStore> Drop for ScanSession<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
