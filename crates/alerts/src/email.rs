//! Email delivery through the SendGrid v3 `mail/send` API.

use crate::notifier::{AlertError, GasAlert, Notifier};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Display name used for the sender.
pub const SENDER_NAME: &str = "Gas Alert";
/// Display name used for the recipient.
pub const RECIPIENT_NAME: &str = "Target user";

/// SendGrid credentials and addresses.
#[derive(Clone)]
pub struct EmailConfig {
    /// API endpoint.
    pub base_url: String,
    /// SendGrid API key.
    pub api_key: String,
    /// "From" address.
    pub from_email: String,
    /// "To" address.
    pub to_email: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("to_email", &self.to_email)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EmailConfig {
    pub const BASE_URL: &'static str = "https://api.sendgrid.com";

    pub fn new(
        api_key: impl Into<String>,
        from_email: impl Into<String>,
        to_email: impl Into<String>,
    ) -> Self {
        Self {
            base_url: Self::BASE_URL.to_string(),
            api_key: api_key.into(),
            from_email: from_email.into(),
            to_email: to_email.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Point the mailer at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

/// Build the single-recipient request body. Subject, plain text and HTML all carry the same text.
fn build_request<'a>(config: &'a EmailConfig, text: &'a str) -> MailSendRequest<'a> {
    MailSendRequest {
        personalizations: [Personalization {
            to: [Address {
                email: &config.to_email,
                name: RECIPIENT_NAME,
            }],
        }],
        from: Address {
            email: &config.from_email,
            name: SENDER_NAME,
        },
        subject: text,
        content: [
            Content {
                content_type: "text/plain",
                value: text,
            },
            Content {
                content_type: "text/html",
                value: text,
            },
        ],
    }
}

/// Notifier that emails alerts through SendGrid.
pub struct SendGridMailer {
    config: EmailConfig,
    http_client: reqwest::Client,
}

impl SendGridMailer {
    pub fn new(config: EmailConfig) -> Result<Self, AlertError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Send one email whose subject and body are `text`.
    pub async fn send_text(&self, text: &str) -> Result<(), AlertError> {
        let url = format!("{}/v3/mail/send", self.config.base_url.trim_end_matches('/'));
        let request = build_request(&self.config, text);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "SendGrid returned non-success status");
            return Err(AlertError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(to = %self.config.to_email, subject = text, "Alert email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SendGridMailer {
    async fn send_alert(&self, alert: &GasAlert) -> Result<(), AlertError> {
        self.send_text(&alert.subject()).await
    }
}
