//! Etherscan gas tracker client.
//!
//! Calls `GET {base_url}?module=gastracker&action=gasoracle&gasprice=..&apikey=..`
//! and decodes the response into a [`GasQuote`].

use crate::{FeedError, GasOracle};
use async_trait::async_trait;
use gas_core::GasQuote;
use std::time::Duration;
use tracing::debug;

/// Etherscan client settings.
#[derive(Clone)]
pub struct EtherscanConfig {
    /// API endpoint.
    pub base_url: String,
    /// Etherscan API key.
    pub api_key: String,
    /// Reference gas price in wei sent with every request.
    pub gas_price_wei: u64,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for EtherscanConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtherscanConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("gas_price_wei", &self.gas_price_wei)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EtherscanConfig {
    pub const BASE_URL: &'static str = "https://api.etherscan.io/api";
    /// 2 gwei.
    pub const GAS_PRICE_WEI: u64 = 2_000_000_000;

    /// Create a config for the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::BASE_URL.to_string(),
            api_key: api_key.into(),
            gas_price_wei: Self::GAS_PRICE_WEI,
            timeout: Duration::from_secs(10),
        }
    }

    /// Point the client at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Gas oracle backed by the Etherscan REST API.
pub struct EtherscanClient {
    config: EtherscanConfig,
    http_client: reqwest::Client,
}

impl EtherscanClient {
    /// Create a client. The underlying HTTP client is reused for every poll.
    pub fn new(config: EtherscanConfig) -> Result<Self, FeedError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn query(&self) -> [(&'static str, String); 4] {
        [
            ("module", "gastracker".to_string()),
            ("action", "gasoracle".to_string()),
            ("gasprice", self.config.gas_price_wei.to_string()),
            ("apikey", self.config.api_key.clone()),
        ]
    }
}

#[async_trait]
impl GasOracle for EtherscanClient {
    async fn fetch_quote(&self) -> Result<GasQuote, FeedError> {
        let response = self
            .http_client
            .get(&self.config.base_url)
            .query(&self.query())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let quote: GasQuote = serde_json::from_str(&body)?;

        if let Some(prices) = quote.prices() {
            debug!(
                status = %quote.status,
                safe = %prices.safe_gas_price,
                propose = prices.propose_gas_price.as_deref().unwrap_or("-"),
                fast = prices.fast_gas_price.as_deref().unwrap_or("-"),
                base_fee = prices.suggest_base_fee.as_deref().unwrap_or("-"),
                block = prices.last_block.as_deref().unwrap_or("-"),
                "Gas oracle quote"
            );
        }

        Ok(quote)
    }
}
