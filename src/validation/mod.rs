pub mod workflow;

pub use workflow::{ValidatedOrder, ValidationError, ValidationWorkflow};
