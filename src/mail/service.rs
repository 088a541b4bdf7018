use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use super::{DeliveryError, Mailer, OutgoingEmail, SentMessage};
use crate::config::Config;
use crate::models::{EmailContent, SendResult};

/// Dispatches validated sends through a shared [`Mailer`].
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    default_from: String,
    send_timeout: Duration,
    bulk_concurrency: usize,
}

impl EmailService {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        default_from: impl Into<String>,
        send_timeout: Duration,
        bulk_concurrency: usize,
    ) -> Self {
        Self {
            mailer,
            default_from: default_from.into(),
            send_timeout,
            bulk_concurrency: bulk_concurrency.max(1),
        }
    }

    pub fn from_config(mailer: Arc<dyn Mailer>, config: &Config) -> Self {
        Self::new(
            mailer,
            config.smtp.default_from.clone(),
            config.smtp.send_timeout,
            config.bulk_concurrency,
        )
    }

    async fn deliver(
        &self,
        recipient: &str,
        content: &EmailContent,
    ) -> Result<SentMessage, DeliveryError> {
        let email = OutgoingEmail {
            from: content
                .from
                .clone()
                .unwrap_or_else(|| self.default_from.clone()),
            to: recipient.to_string(),
            subject: content.subject.clone(),
            body: content.body.clone(),
        };

        tokio::time::timeout(self.send_timeout, self.mailer.send(&email))
            .await
            .map_err(|_| DeliveryError::Timeout(self.send_timeout))?
    }

    /// Send to one recipient. Failures are reported in the result, never raised.
    pub async fn send_one(&self, recipient: &str, content: &EmailContent) -> SendResult {
        match self.deliver(recipient, content).await {
            Ok(sent) => {
                tracing::info!(recipient, message_id = %sent.message_id, "Email sent");
                SendResult::sent(recipient, sent.message_id)
            }
            Err(e) => {
                tracing::warn!(recipient, error = %e, "Email delivery failed");
                SendResult::failed(recipient, e.to_string())
            }
        }
    }

    /// Send the same content to every recipient, one independent attempt each.
    ///
    /// Up to `bulk_concurrency` sends are in flight at once. Results come back
    /// in input order, one per address, duplicates included.
    pub async fn send_many(&self, recipients: &[String], content: &EmailContent) -> Vec<SendResult> {
        let sends: Vec<_> = recipients
            .iter()
            .map(|recipient| self.send_one(recipient, content))
            .collect();
        let results: Vec<SendResult> = stream::iter(sends)
            .buffered(self.bulk_concurrency)
            .collect()
            .await;

        let sent = results.iter().filter(|r| r.success).count();
        tracing::info!(
            total = results.len(),
            sent,
            failed = results.len() - sent,
            "Bulk email processing completed"
        );

        results
    }

    /// Check the upstream configuration without sending mail.
    pub async fn verify(&self) -> Result<(), DeliveryError> {
        tokio::time::timeout(self.send_timeout, self.mailer.verify())
            .await
            .map_err(|_| DeliveryError::Timeout(self.send_timeout))?
    }
}
