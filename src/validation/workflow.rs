// Order validation workflow: lookup, guard, conditional write.
//
// This is the one piece of business logic in the terminal. An attempt is
// a single identifier, typed or decoded, and every failure is terminal for
// that attempt; the operator retries by hand.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{OrderRecord, OrderStore, StoreError, UpdateOutcome};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("order {id} not found")]
    NotFound { id: String },
    #[error("order {id} was already validated")]
    AlreadyValidated { id: String },
    #[error("lookup for order {id} failed: {source}")]
    Lookup { id: String, source: StoreError },
    #[error("update for order {id} failed: {source}")]
    Update { id: String, source: StoreError },
}

/// Outcome of a successful validation.
///
/// `order` is the pre-update snapshot read during lookup, so callers can
/// display what was validated without a second round trip. The stored row
/// is `Completed` by the time this value exists.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    pub order: OrderRecord,
    pub validated_at: DateTime<Utc>,
}

pub struct ValidationWorkflow<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> ValidationWorkflow<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate one order identifier.
    ///
    /// Lookup failures and the already-scanned guard both return before any
    /// write is issued. The write itself is conditional on the row still
    /// being pending, so two operators racing on the same ticket cannot
    /// both succeed: the loser of the write observes `AlreadyValidated`.
    pub async fn validate(&self, identifier: &str) -> Result<ValidatedOrder, ValidationError> {
        let id = identifier.trim();

        let order = self
            .store
            .fetch_order(id)
            .await
            .map_err(|source| ValidationError::Lookup {
                id: id.to_string(),
                source,
            })?
            .ok_or_else(|| ValidationError::NotFound { id: id.to_string() })?;

        if order.is_scanned {
            warn!(order_id = %id, "order was already validated");
            return Err(ValidationError::AlreadyValidated { id: id.to_string() });
        }

        let outcome = self
            .store
            .complete_order(id)
            .await
            .map_err(|source| ValidationError::Update {
                id: id.to_string(),
                source,
            })?;

        match outcome {
            UpdateOutcome::Completed => {
                info!(
                    order_id = %id,
                    coffee_type = %order.coffee_type,
                    "order validated"
                );
                Ok(ValidatedOrder {
                    order,
                    validated_at: Utc::now(),
                })
            }
            // The row stopped matching between our read and our write: a
            // concurrent terminal got there first.
            UpdateOutcome::NoPendingRow => {
                warn!(order_id = %id, "order validated concurrently by another terminal");
                Err(ValidationError::AlreadyValidated { id: id.to_string() })
            }
        }
    }
}
