// In-memory order store for tests - no network, records every issued call
// so tests can assert that guards short-circuit before any write.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::store::client::OrderStore;
use crate::store::errors::StoreError;
use crate::store::types::{OrderRecord, OrderStatus, UpdateOutcome};

/// Calls issued against the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Fetch { id: String },
    Complete { id: String },
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    rows: Mutex<HashMap<String, OrderRecord>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_next_update: Mutex<bool>,
    flip_after_next_fetch: Mutex<bool>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(self, record: OrderRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&self, record: OrderRecord) {
        self.rows
            .lock()
            .expect("store mock lock poisoned")
            .insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<OrderRecord> {
        self.rows
            .lock()
            .expect("store mock lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn issued_calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("store mock lock poisoned").clone()
    }

    pub fn update_call_count(&self) -> usize {
        self.issued_calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::Complete { .. }))
            .count()
    }

    /// Make the next `complete_order` call report an API failure.
    pub fn fail_next_update(&self) {
        *self.fail_next_update.lock().expect("store mock lock poisoned") = true;
    }

    /// Mark the row scanned right after the next fetch returns, as if a
    /// concurrent terminal's write landed between our read and our write.
    pub fn validate_concurrently_after_next_fetch(&self) {
        *self
            .flip_after_next_fetch
            .lock()
            .expect("store mock lock poisoned") = true;
    }

    fn record_call(&self, call: StoreCall) {
        self.calls.lock().expect("store mock lock poisoned").push(call);
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn fetch_order(&self, id: &str) -> Result<Option<OrderRecord>, StoreError> {
        self.record_call(StoreCall::Fetch { id: id.to_string() });
        let snapshot = self.get(id);

        let mut flip = self
            .flip_after_next_fetch
            .lock()
            .expect("store mock lock poisoned");
        if *flip {
            *flip = false;
            drop(flip);
            let mut rows = self.rows.lock().expect("store mock lock poisoned");
            if let Some(row) = rows.get_mut(id) {
                row.is_scanned = true;
                row.status = OrderStatus::Completed;
            }
        }

        Ok(snapshot)
    }

    async fn complete_order(&self, id: &str) -> Result<UpdateOutcome, StoreError> {
        self.record_call(StoreCall::Complete { id: id.to_string() });

        let mut should_fail = self.fail_next_update.lock().expect("store mock lock poisoned");
        if *should_fail {
            *should_fail = false;
            return Err(StoreError::Api {
                status: 500,
                body: "injected update failure".to_string(),
            });
        }
        drop(should_fail);

        // Same conditional semantics as the row API: only a pending row matches.
        let mut rows = self.rows.lock().expect("store mock lock poisoned");
        match rows.get_mut(id) {
            Some(row) if row.is_pending() => {
                row.is_scanned = true;
                row.status = OrderStatus::Completed;
                Ok(UpdateOutcome::Completed)
            }
            _ => Ok(UpdateOutcome::NoPendingRow),
        }
    }
}
