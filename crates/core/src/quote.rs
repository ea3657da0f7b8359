//! Gas oracle quote as returned by the Etherscan `gastracker` module.

use crate::QuoteError;
use serde::{Deserialize, Serialize};

/// Status value the oracle reports for a successful call.
pub const STATUS_OK: &str = "1";

/// One gas oracle response.
///
/// Produced fresh on every poll and discarded right after the threshold check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasQuote {
    /// "1" on success, "0" on failure.
    pub status: String,
    /// Human readable status ("OK", "NOTOK", ...).
    #[serde(default)]
    pub message: String,
    /// Oracle payload.
    #[serde(default)]
    pub result: OracleResult,
}

/// The `result` field: price tiers on success, an error string otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OracleResult {
    Prices(GasOracleResult),
    Detail(String),
}

impl Default for OracleResult {
    fn default() -> Self {
        OracleResult::Detail(String::new())
    }
}

/// Gas price tiers in gwei, encoded by the provider as numeric strings.
///
/// Only `SafeGasPrice` drives alerts; the other tiers are kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GasOracleResult {
    #[serde(rename = "SafeGasPrice", default)]
    pub safe_gas_price: String,
    #[serde(rename = "ProposeGasPrice", default)]
    pub propose_gas_price: Option<String>,
    #[serde(rename = "FastGasPrice", default)]
    pub fast_gas_price: Option<String>,
    #[serde(rename = "suggestBaseFee", default)]
    pub suggest_base_fee: Option<String>,
    #[serde(rename = "LastBlock", default)]
    pub last_block: Option<String>,
}

impl GasQuote {
    /// Check whether the oracle reported success.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Price tiers, if the oracle returned them.
    pub fn prices(&self) -> Option<&GasOracleResult> {
        match &self.result {
            OracleResult::Prices(prices) => Some(prices),
            OracleResult::Detail(_) => None,
        }
    }

    /// Validate the status and parse the safe gas price.
    pub fn safe_gas_price(&self) -> Result<f64, QuoteError> {
        match (&self.result, self.is_ok()) {
            (OracleResult::Prices(prices), true) => parse_gas_price(&prices.safe_gas_price),
            (OracleResult::Detail(detail), true) => Err(QuoteError::MissingPrices(detail.clone())),
            (result, false) => Err(QuoteError::UnexpectedStatus {
                status: self.status.clone(),
                message: self.message.clone(),
                detail: match result {
                    OracleResult::Detail(detail) => detail.clone(),
                    OracleResult::Prices(_) => String::new(),
                },
            }),
        }
    }
}

/// Parse a provider gas price string.
pub fn parse_gas_price(value: &str) -> Result<f64, QuoteError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| QuoteError::InvalidPrice {
            value: value.to_string(),
            reason: e.to_string(),
        })
}
