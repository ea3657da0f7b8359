//! Gas price alert delivery.
//!
//! This crate provides:
//! - The [`Notifier`] trait the monitor sends alerts through
//! - Alert message formatting
//! - A SendGrid email client

pub mod email;
pub mod notifier;

pub use email::{EmailConfig, SendGridMailer};
pub use notifier::{format_alert_subject, AlertError, GasAlert, Notifier};
