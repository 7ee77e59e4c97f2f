// Row types for the hosted order table

use serde::{Deserialize, Serialize};

/// Lifecycle label carried alongside the `is_scanned` flag.
///
/// The backend stores this as plain text, so the serde names match the
/// strings the table actually contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// One row of the order table.
///
/// `is_scanned` and `status` are kept synchronized by the validation
/// workflow: a row is `Completed` exactly when it has been scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Opaque identifier assigned when the order was created.
    pub id: String,
    /// Set true exactly once, by a successful validation.
    pub is_scanned: bool,
    pub status: OrderStatus,
    /// Descriptive label shown to the operator; never written by us.
    pub coffee_type: String,
}

impl OrderRecord {
    pub fn is_pending(&self) -> bool {
        !self.is_scanned
    }
}

/// Result of the conditional completion write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A pending row matched and was marked scanned.
    Completed,
    /// No pending row matched the filter. Either the order is gone or a
    /// concurrent operator validated it between our read and our write.
    NoPendingRow,
}
