pub mod openfoodfacts;
pub mod usda;

// Re-export common types
pub use openfoodfacts::OpenFoodFactsClient;
pub use usda::UsdaClient;

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Failures inside a lookup client. These never leave the client: they are
/// logged and turned into "no record" or a fallback record.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Every lookup request is bounded by the same per-call timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, LookupError> {
    Ok(Client::builder().timeout(timeout).build()?)
}
