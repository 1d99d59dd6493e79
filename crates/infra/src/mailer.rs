//! Outbound mail relay.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::alerts::Notification;
use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("sender credentials not configured")]
    NotConfigured,

    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("rejected by relay: {0}")]
    Rejected(String),
}

/// Delivers rendered notifications.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, notification: &Notification) -> Result<(), MailError>;
}

/// SMTP relay with STARTTLS and sender login.
pub struct SmtpMailer {
    relay: Option<(AsyncSmtpTransport<Tokio1Executor>, Mailbox)>,
}

impl SmtpMailer {
    /// Build the relay client. Missing credentials are not an error here:
    /// every send then fails with [`MailError::NotConfigured`].
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let (Some(sender), Some(password)) = (&config.sender, &config.password) else {
            return Ok(Self { relay: None });
        };

        let from = parse_mailbox(sender)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(sender.clone(), password.clone()))
            .build();

        Ok(Self {
            relay: Some((transport, from)),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.relay.is_some()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, notification: &Notification) -> Result<(), MailError> {
        let (transport, from) = self.relay.as_ref().ok_or(MailError::NotConfigured)?;

        let message = Message::builder()
            .from(from.clone())
            .to(parse_mailbox(&notification.to)?)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(notification.html_body.clone())?;

        transport.send(message).await?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// In-memory mailer for tests/dev: records what it "sent".
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<Notification>>,
    rejected: HashSet<String>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every notification addressed to `address`.
    pub fn rejecting(mut self, address: impl Into<String>) -> Self {
        self.rejected.insert(address.into());
        self
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, notification: &Notification) -> Result<(), MailError> {
        if self.rejected.contains(&notification.to) {
            return Err(MailError::Rejected(notification.to.clone()));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Rejected("mailbox lock poisoned".to_string()))?
            .push(notification.clone());
        Ok(())
    }
}
