//! Outbound mail: the transport abstraction and the dispatch service on top of it.

pub mod service;
pub mod smtp;

use std::time::Duration;

use async_trait::async_trait;

use crate::models::EmailBody;

pub use service::EmailService;
pub use smtp::SmtpMailer;

/// One fully-addressed message, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: EmailBody,
}

/// What the transport hands back after accepting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("{0}")]
    Smtp(String),

    #[error("SMTP operation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Transport used by [`EmailService`]. Implemented by [`SmtpMailer`]; tests plug in fakes.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Deliver one message.
    async fn send(&self, email: &OutgoingEmail) -> Result<SentMessage, DeliveryError>;

    /// Connect and authenticate without sending anything.
    async fn verify(&self) -> Result<(), DeliveryError>;
}
