// Scan session state machine.
//
// The original operator UI tracked "is scanning" and "show confirmation"
// as independent booleans; here the combinations that make sense are the
// only ones expressible. The session driver owns the async work (decoder
// channel, validation calls) and feeds the machine events; the machine
// only decides what state the session is in.

use statig::prelude::*;
use tracing::{debug, info};

/// Events fed to the scan state machine by the session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Capture device opened, decode events flowing.
    SessionOpened,
    /// Decoder produced a payload.
    PayloadDecoded { data: String },
    /// Operator accepted the pending payload.
    Confirmed,
    /// Operator discarded the pending payload.
    Declined,
    /// The validation workflow finished (either way) for the pending payload.
    ValidationFinished,
    /// Result acknowledged; resume scanning.
    Dismissed,
    /// Session stopped; any pending payload is dropped.
    Stopped,
}

pub struct ScanStateMachine {
    confirm_before_validate: bool,
}

impl ScanStateMachine {
    pub fn new(confirm_before_validate: bool) -> Self {
        Self {
            confirm_before_validate,
        }
    }
}

#[state_machine(initial = "State::idle()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl ScanStateMachine {
    #[state]
    fn idle(&mut self, event: &ScanEvent) -> Response<State> {
        match event {
            ScanEvent::SessionOpened => {
                info!("scan session opened");
                Transition(State::scanning())
            }
            // stop() while already idle is a no-op
            _ => Handled,
        }
    }

    #[state]
    fn scanning(&mut self, event: &ScanEvent) -> Response<State> {
        match event {
            ScanEvent::PayloadDecoded { data } => {
                debug!(payload = %data, "payload decoded");
                if self.confirm_before_validate {
                    Transition(State::awaiting_confirmation())
                } else {
                    // The session validates immediately and reports back
                    // with ValidationFinished.
                    Handled
                }
            }
            ScanEvent::ValidationFinished => Transition(State::showing_result()),
            ScanEvent::Stopped => {
                info!("scan session stopped");
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[state]
    fn awaiting_confirmation(&mut self, event: &ScanEvent) -> Response<State> {
        match event {
            // Stays here until the session reports the workflow outcome.
            ScanEvent::Confirmed => Handled,
            ScanEvent::ValidationFinished => Transition(State::showing_result()),
            ScanEvent::Declined => {
                debug!("pending payload declined");
                Transition(State::scanning())
            }
            ScanEvent::Stopped => Transition(State::idle()),
            _ => Handled,
        }
    }

    #[state]
    fn showing_result(&mut self, event: &ScanEvent) -> Response<State> {
        match event {
            ScanEvent::Dismissed => Transition(State::scanning()),
            ScanEvent::Stopped => Transition(State::idle()),
            _ => Handled,
        }
    }
}
