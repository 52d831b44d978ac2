//! Market data interface

use crate::shared::errors::FetchError;
use async_trait::async_trait;

/// Source of latest prices. Implementations apply their own request timeout.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn price_of(&self, symbol: &str) -> Result<f64, FetchError>;
}
