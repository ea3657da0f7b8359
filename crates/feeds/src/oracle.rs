//! Gas oracle abstraction.

use crate::FeedError;
use async_trait::async_trait;
use gas_core::GasQuote;

/// Source of gas price quotes.
#[async_trait]
pub trait GasOracle: Send + Sync {
    /// Fetch the current quote. Status and price are validated by the caller.
    async fn fetch_quote(&self) -> Result<GasQuote, FeedError>;

    /// Fetch a quote and return its safe gas price.
    async fn fetch_safe_gas_price(&self) -> Result<f64, FeedError> {
        let quote = self.fetch_quote().await?;
        Ok(quote.safe_gas_price()?)
    }
}
