//! Per-endpoint request checks. Empty strings count as missing; whitespace does not.

use serde_json::Value;

use crate::error::ValidationError;
use crate::models::{BulkSendRequest, EmailBody, EmailContent, SendRequest};

/// A single-recipient send that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSend {
    pub to: String,
    pub content: EmailContent,
}

/// A bulk send that passed validation. `recipients` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBulkSend {
    pub recipients: Vec<String>,
    pub content: EmailContent,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn build_content(
    from: Option<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
) -> Option<EmailContent> {
    let subject = present(subject)?;
    let body = EmailBody::from_parts(present(text), present(html))?;

    Some(EmailContent {
        from: present(from),
        subject,
        body,
    })
}

pub fn validate_send(request: SendRequest) -> Result<ValidSend, ValidationError> {
    let to = present(request.to).ok_or(ValidationError::MissingSendFields)?;
    let content = build_content(request.from, request.subject, request.text, request.html)
        .ok_or(ValidationError::MissingSendFields)?;

    Ok(ValidSend { to, content })
}

/// A non-empty JSON array of strings, or nothing.
fn recipient_list(emails: Option<Value>) -> Option<Vec<String>> {
    match emails? {
        Value::Array(items) if !items.is_empty() => items
            .into_iter()
            .map(|item| match item {
                Value::String(address) => Some(address),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// Recipients keep their order and duplicates.
pub fn validate_bulk(request: BulkSendRequest) -> Result<ValidBulkSend, ValidationError> {
    let recipients =
        recipient_list(request.emails).ok_or(ValidationError::MissingRecipients)?;
    let content = build_content(request.from, request.subject, request.text, request.html)
        .ok_or(ValidationError::MissingBulkFields)?;

    Ok(ValidBulkSend {
        recipients,
        content,
    })
}
