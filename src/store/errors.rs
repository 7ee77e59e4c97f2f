use thiserror::Error;

/// Failures reported by the hosted order store.
///
/// Every variant is terminal for the current attempt; there is no retry
/// machinery anywhere in this crate. The operator re-types or re-scans.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to order store failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("order store returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("order store returned a malformed payload: {0}")]
    Malformed(String),
}

impl StoreError {
    /// True when the backend answered but refused us, as opposed to the
    /// request never completing.
    pub fn is_api_error(&self) -> bool {
        matches!(self, StoreError::Api { .. })
    }
}
