// REST client for the hosted order table.
//
// The backend exposes a PostgREST-style row API: point lookup by key and
// partial-field update by key, filtered through query parameters. This is
// the only surface we consume; query planning, auth and persistence all
// live on the other side of it.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::store::errors::StoreError;
use crate::store::types::{OrderRecord, UpdateOutcome};

/// Order store operations, behind a trait so the validation workflow can be
/// exercised against an in-memory double.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Point lookup by order id. `Ok(None)` means the id is unknown.
    async fn fetch_order(&self, id: &str) -> Result<Option<OrderRecord>, StoreError>;

    /// Mark an order scanned and completed, in one write, guarded by the
    /// store itself: only a row that is still pending can match. Reports
    /// whether any row did.
    async fn complete_order(&self, id: &str) -> Result<UpdateOutcome, StoreError>;
}

// Sessions take the store by value; sharing one between a session and its
// owner goes through Arc.
#[async_trait]
impl<S: OrderStore + ?Sized> OrderStore for std::sync::Arc<S> {
    async fn fetch_order(&self, id: &str) -> Result<Option<OrderRecord>, StoreError> {
        (**self).fetch_order(id).await
    }

    async fn complete_order(&self, id: &str) -> Result<UpdateOutcome, StoreError> {
        (**self).complete_order(id).await
    }
}

/// `OrderStore` backed by the hosted row API.
#[derive(Debug, Clone)]
pub struct RestOrderStore {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    table: String,
}

impl RestOrderStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
        })
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }

    async fn read_rows(&self, response: reqwest::Response) -> Result<Vec<OrderRecord>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "order store refused the request");
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Vec<OrderRecord>>()
            .await
            .map_err(|err| StoreError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl OrderStore for RestOrderStore {
    async fn fetch_order(&self, id: &str) -> Result<Option<OrderRecord>, StoreError> {
        debug!(order_id = %id, "fetching order");
        let key_filter = format!("eq.{id}");
        let request = self
            .http
            .get(self.rows_url())
            .query(&[("select", "*"), ("id", key_filter.as_str())]);
        let response = self.authorize(request).send().await?;
        let rows = self.read_rows(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn complete_order(&self, id: &str) -> Result<UpdateOutcome, StoreError> {
        debug!(order_id = %id, "marking order scanned");
        // The is_scanned filter makes the write conditional: a row that was
        // validated by a concurrent operator after our read no longer
        // matches, and the representation comes back empty.
        let key_filter = format!("eq.{id}");
        let request = self
            .http
            .patch(self.rows_url())
            .query(&[("id", key_filter.as_str()), ("is_scanned", "eq.false")])
            .header("Prefer", "return=representation")
            .json(&json!({ "is_scanned": true, "status": "Completed" }));
        let response = self.authorize(request).send().await?;
        let rows = self.read_rows(response).await?;
        if rows.is_empty() {
            Ok(UpdateOutcome::NoPendingRow)
        } else {
            Ok(UpdateOutcome::Completed)
        }
    }
}
