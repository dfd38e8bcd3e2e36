pub mod http_source;
pub mod models;

pub use http_source::HttpOrderSource;
pub use models::{RawItem, RawOrder};

use async_trait::async_trait;
use domain::OrderIdentifier;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Order source request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Order source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Order source rejected credentials")]
    Unauthorized,

    #[error("Invalid order source response: {0}")]
    InvalidResponse(String),

    #[error("Invalid order source configuration: {0}")]
    Configuration(String),
}

/// External system that knows order details.
///
/// `Ok(None)` means the source answered and has no such order.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn get_order(&self, order_id: &OrderIdentifier) -> Result<Option<RawOrder>, SourceError>;

    /// Label used in logs
    fn name(&self) -> &'static str;
}
