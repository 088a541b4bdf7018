use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use super::{DeliveryError, Mailer, OutgoingEmail, SentMessage};
use crate::config::SmtpConfig;
use crate::models::EmailBody;

/// Mailer backed by a lettre SMTP transport.
///
/// Building it does not touch the network; the transport connects on each
/// send or verify and keeps idle connections in its own pool.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let relay = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        };
        let builder = relay.map_err(|e| DeliveryError::Smtp(e.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.send_timeout))
            .build();

        Ok(Self { transport })
    }

    /// Build the MIME message and the Message-ID stamped on it.
    fn build_message(email: &OutgoingEmail) -> Result<(Message, String), DeliveryError> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(email.from.clone()))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(email.to.clone()))?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .message_id(Some(message_id.clone()));

        let message = match &email.body {
            EmailBody::Text(text) => builder.singlepart(SinglePart::plain(text.clone())),
            EmailBody::Html(html) => builder.singlepart(SinglePart::html(html.clone())),
            EmailBody::Both { text, html } => builder.multipart(
                MultiPart::alternative_plain_html(text.clone(), html.clone()),
            ),
        }
        .map_err(|e| DeliveryError::Build(e.to_string()))?;

        Ok((message, message_id))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentMessage, DeliveryError> {
        let (message, message_id) = Self::build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Smtp(e.to_string()))?;

        tracing::debug!(
            message_id = %message_id,
            code = %response.code(),
            "SMTP server accepted message"
        );

        Ok(SentMessage { message_id })
    }

    async fn verify(&self) -> Result<(), DeliveryError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DeliveryError::Smtp(
                "SMTP server did not accept the connection test".to_string(),
            )),
            Err(e) => Err(DeliveryError::Smtp(e.to_string())),
        }
    }
}
