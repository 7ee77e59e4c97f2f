// Brewpass Library - Coffee-Shop Order Validation
// This exposes the core components for testing and integration

pub mod config;
pub mod scanner;
pub mod store;
pub mod telemetry;
pub mod validation;

// Re-export key types for easy access
pub use config::{BrewpassConfig, ScannerConfig, StoreConfig};
pub use scanner::{
    DecodeEvent, DecodedPayload, QrDecoder, ScanError, ScanSession, ScanState, ScanTurn,
    StdinDecoder,
};
pub use store::{OrderRecord, OrderStatus, OrderStore, RestOrderStore, StoreError, UpdateOutcome};
pub use telemetry::init_telemetry;
pub use validation::{ValidatedOrder, ValidationError, ValidationWorkflow};
