use serde::{Deserialize, Serialize};

/// Body of `POST /send-email`. Presence rules live in `validation`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendRequest {
    pub to: Option<String>,
    pub from: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
}

/// Body of `POST /send-bulk`.
///
/// `emails` is kept as raw JSON so a malformed list is reported by
/// `validation` rather than by the body extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkSendRequest {
    pub emails: Option<serde_json::Value>,
    pub from: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
}

/// Validated message content, shared by every recipient of a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub from: Option<String>,
    pub subject: String,
    pub body: EmailBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Text(String),
    Html(String),
    Both { text: String, html: String },
}

impl EmailBody {
    /// `None` when neither part is present.
    pub fn from_parts(text: Option<String>, html: Option<String>) -> Option<Self> {
        match (text, html) {
            (Some(text), Some(html)) => Some(EmailBody::Both { text, html }),
            (Some(text), None) => Some(EmailBody::Text(text)),
            (None, Some(html)) => Some(EmailBody::Html(html)),
            (None, None) => None,
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub recipient: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    pub fn sent(recipient: impl Into<String>, message_id: String) -> Self {
        Self {
            recipient: recipient.into(),
            success: true,
            message_id: Some(message_id),
            error: None,
        }
    }

    pub fn failed(recipient: impl Into<String>, error: String) -> Self {
        Self {
            recipient: recipient.into(),
            success: false,
            message_id: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message_id: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BulkSendResponse {
    pub success: bool,
    pub message: &'static str,
    pub results: Vec<SendResult>,
}

#[derive(Debug, Serialize)]
pub struct TestConfigResponse {
    pub success: bool,
    pub message: &'static str,
}
