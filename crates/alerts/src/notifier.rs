//! Alert notification abstraction.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Email request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Email provider rejected message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A gas price that crossed the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasAlert {
    pub gas: f64,
}

impl GasAlert {
    pub fn new(gas: f64) -> Self {
        Self { gas }
    }

    /// Subject line, also used as the message body.
    pub fn subject(&self) -> String {
        format_alert_subject(self.gas)
    }
}

/// Format the alert text with one decimal place, e.g. `Gas is now 25.5`.
pub fn format_alert_subject(gas: f64) -> String {
    format!("Gas is now {:.1}", gas)
}

/// Delivery channel for gas alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert. An `Ok` means the provider accepted the message.
    async fn send_alert(&self, alert: &GasAlert) -> Result<(), AlertError>;
}
