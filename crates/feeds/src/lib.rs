//! Gas price feeds.
//!
//! This crate provides:
//! - The [`GasOracle`] trait the monitor polls
//! - An Etherscan gas tracker client implementing it

pub mod error;
pub mod etherscan;
pub mod oracle;

pub use error::FeedError;
pub use etherscan::{EtherscanClient, EtherscanConfig};
pub use oracle::GasOracle;
