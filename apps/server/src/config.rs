//! Application configuration.
//!
//! Everything is read from the environment once at startup:
//!
//! | Variable              | Meaning                         |
//! |-----------------------|---------------------------------|
//! | `ETHERSCAN_API_KEY`   | gas oracle API key              |
//! | `BELOW_GAS`           | alert threshold                 |
//! | `SENDGRID_API_KEY`    | email provider API key          |
//! | `SENDGRID_FROM_EMAIL` | sender address                  |
//! | `ALERT_EMAIL`         | recipient address               |

use gas_alerts::EmailConfig;
use gas_core::{GasThreshold, ThresholdError};
use gas_feeds::EtherscanConfig;
use std::time::Duration;
use thiserror::Error;

pub const ENV_ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";
pub const ENV_BELOW_GAS: &str = "BELOW_GAS";
pub const ENV_SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";
pub const ENV_SENDGRID_FROM_EMAIL: &str = "SENDGRID_FROM_EMAIL";
pub const ENV_ALERT_EMAIL: &str = "ALERT_EMAIL";

/// Time between the starts of consecutive polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Pause after a successfully delivered alert.
pub const ALERT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid target gas {value:?}: {source}")]
    InvalidThreshold {
        value: String,
        #[source]
        source: ThresholdError,
    },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Gas oracle client settings.
    pub oracle: EtherscanConfig,
    /// Email delivery settings.
    pub email: EmailConfig,
    /// Loop settings.
    pub monitor: MonitorSettings,
}

/// Monitor loop settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorSettings {
    /// Alert when the safe gas price is at or below this value.
    pub threshold: GasThreshold,
    pub poll_interval: Duration,
    pub cooldown: Duration,
}

impl MonitorSettings {
    pub fn new(threshold: GasThreshold) -> Self {
        Self {
            threshold,
            poll_interval: POLL_INTERVAL,
            cooldown: ALERT_COOLDOWN,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let raw_threshold = require(ENV_BELOW_GAS)?;
        let threshold =
            raw_threshold
                .parse::<GasThreshold>()
                .map_err(|source| ConfigError::InvalidThreshold {
                    value: raw_threshold.clone(),
                    source,
                })?;

        let oracle = EtherscanConfig::new(require(ENV_ETHERSCAN_API_KEY)?);
        let email = EmailConfig::new(
            require(ENV_SENDGRID_API_KEY)?,
            require(ENV_SENDGRID_FROM_EMAIL)?,
            require(ENV_ALERT_EMAIL)?,
        );

        Ok(Self {
            oracle,
            email,
            monitor: MonitorSettings::new(threshold),
        })
    }
}
