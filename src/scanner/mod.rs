// Scan session module - lifecycle of the external QR decoding session.
//
// The decoder itself (camera access, frame decoding) is an external
// collaborator behind the QrDecoder trait; this module owns when it runs,
// what happens to its payloads, and that it is always released.

#[cfg(any(test, feature = "testing"))]
pub mod mocks;
pub mod session;
pub mod state_machine;
pub mod stdin;
pub mod traits;
pub mod types;

pub use session::{ScanSession, ScanTurn};
pub use state_machine::{ScanEvent, ScanStateMachine, State as ScanState};
pub use stdin::StdinDecoder;
pub use traits::QrDecoder;
pub use types::{DecodeEvent, DecodedPayload, ScanError};
