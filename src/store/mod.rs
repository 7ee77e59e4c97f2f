// Order store module - the hosted record API this terminal is a client of.
//
// The trait seam in client.rs is what the validation workflow depends on;
// the REST implementation is the only one wired up in the binary.

pub mod client;
pub mod errors;
#[cfg(any(test, feature = "testing"))]
pub mod mocks;
pub mod types;

pub use client::{OrderStore, RestOrderStore};
pub use errors::StoreError;
pub use types::{OrderRecord, OrderStatus, UpdateOutcome};
