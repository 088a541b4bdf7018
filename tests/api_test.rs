use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use mailrelay::api::create_router;
use mailrelay::config::{Config, SmtpConfig};
use mailrelay::mail::{DeliveryError, EmailService, Mailer, OutgoingEmail, SentMessage};
use mailrelay::state::AppState;

/// In-memory transport: records every message, fails listed recipients.
#[derive(Default)]
struct RecordingMailer {
    failing: Vec<String>,
    verify_error: Option<String>,
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentMessage, DeliveryError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.failing.contains(&email.to) {
            return Err(DeliveryError::Smtp(format!(
                "550 5.1.1 recipient rejected: {}",
                email.to
            )));
        }
        Ok(SentMessage {
            message_id: format!("<{}@relay.test>", self.sent.lock().unwrap().len()),
        })
    }

    async fn verify(&self) -> Result<(), DeliveryError> {
        match &self.verify_error {
            Some(err) => Err(DeliveryError::Smtp(err.clone())),
            None => Ok(()),
        }
    }
}

fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 3001,
        bulk_concurrency: 4,
        smtp: SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            secure: false,
            user: "relay@zone.example".to_string(),
            password: "secret".to_string(),
            default_from: "relay@zone.example".to_string(),
            send_timeout: Duration::from_secs(5),
        },
    }
}

fn app(mailer: Arc<RecordingMailer>) -> Router {
    let config = test_config();
    let email = EmailService::from_config(mailer, &config);
    create_router(AppState::new(config, email))
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_port() {
    let app = app(Arc::new(RecordingMailer::default()));

    for _ in 0..3 {
        let (status, body) = call(app.clone(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "SMTP Server is running", "port": 3001 }));
    }
}

#[tokio::test]
async fn send_email_returns_message_id() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = call(
        app(mailer.clone()),
        "POST",
        "/send-email",
        Some(json!({ "to": "a@x.com", "subject": "Hi", "text": "hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email sent successfully");
    assert!(!body["messageId"].as_str().unwrap_or_default().is_empty());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@x.com");
    assert_eq!(sent[0].from, "relay@zone.example");
}

#[tokio::test]
async fn send_email_without_body_is_rejected() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = call(
        app(mailer.clone()),
        "POST",
        "/send-email",
        Some(json!({ "to": "a@x.com", "subject": "Hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Missing required fields: to, subject, and text/html are required" })
    );
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_email_malformed_json_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/send-email")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(Arc::new(RecordingMailer::default()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_email_delivery_failure_is_server_error() {
    let mailer = Arc::new(RecordingMailer {
        failing: vec!["bad@x.com".to_string()],
        ..Default::default()
    });
    let (status, body) = call(
        app(mailer),
        "POST",
        "/send-email",
        Some(json!({ "to": "bad@x.com", "subject": "Hi", "html": "<p>hello</p>" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to send email");
    assert_eq!(body["details"], "550 5.1.1 recipient rejected: bad@x.com");
}

#[tokio::test]
async fn send_bulk_keeps_input_order() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = call(
        app(mailer),
        "POST",
        "/send-bulk",
        Some(json!({ "emails": ["a@x.com", "b@x.com"], "subject": "S", "html": "<p>H</p>" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Bulk email processing completed");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["recipient"], "a@x.com");
    assert_eq!(results[1]["recipient"], "b@x.com");
    assert!(results.iter().all(|r| r["success"] == true));
}

#[tokio::test]
async fn send_bulk_partial_failure_still_succeeds() {
    let mailer = Arc::new(RecordingMailer {
        failing: vec!["b@x.com".to_string(), "d@x.com".to_string()],
        ..Default::default()
    });
    let emails = ["a@x.com", "b@x.com", "c@x.com", "d@x.com", "a@x.com"];
    let (status, body) = call(
        app(mailer.clone()),
        "POST",
        "/send-bulk",
        Some(json!({ "emails": emails, "subject": "S", "text": "t", "from": "news@zone.example" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let results = body["results"].as_array().unwrap();
    let recipients: Vec<&str> = results
        .iter()
        .map(|r| r["recipient"].as_str().unwrap())
        .collect();
    let flags: Vec<bool> = results
        .iter()
        .map(|r| r["success"].as_bool().unwrap())
        .collect();
    assert_eq!(recipients, emails.to_vec());
    assert_eq!(flags, vec![true, false, true, false, true]);

    assert!(results[1].get("messageId").is_none());
    assert_eq!(results[1]["error"], "550 5.1.1 recipient rejected: b@x.com");
    assert!(results[0].get("error").is_none());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 5);
    assert!(sent.iter().all(|m| m.from == "news@zone.example"));
}

#[tokio::test]
async fn send_bulk_all_failed_still_succeeds() {
    let mailer = Arc::new(RecordingMailer {
        failing: vec!["a@x.com".to_string()],
        ..Default::default()
    });
    let (status, body) = call(
        app(mailer),
        "POST",
        "/send-bulk",
        Some(json!({ "emails": ["a@x.com"], "subject": "S", "text": "t" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["results"][0]["success"], false);
}

#[tokio::test]
async fn send_bulk_empty_list_is_rejected() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = call(
        app(mailer.clone()),
        "POST",
        "/send-bulk",
        Some(json!({ "emails": [], "subject": "S", "text": "t" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "emails array is required and must not be empty" }));
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_bulk_without_subject_is_rejected() {
    let (status, body) = call(
        app(Arc::new(RecordingMailer::default())),
        "POST",
        "/send-bulk",
        Some(json!({ "emails": ["a@x.com"], "text": "t" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "subject and text/html are required" }));
}

#[tokio::test]
async fn test_config_success() {
    let (status, body) = call(
        app(Arc::new(RecordingMailer::default())),
        "POST",
        "/test-config",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "SMTP configuration is valid and ready to send emails" })
    );
}

#[tokio::test]
async fn test_config_unreachable_host() {
    let mailer = Arc::new(RecordingMailer {
        verify_error: Some("Connection error: Connection refused (os error 111)".to_string()),
        ..Default::default()
    });
    let (status, body) = call(app(mailer), "POST", "/test-config", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "SMTP configuration is invalid");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Connection refused"));
}

#[tokio::test]
async fn send_bulk_non_array_emails_is_rejected() {
    for emails in [json!("a@x.com"), json!(["a@x.com", null])] {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = call(
            app(mailer.clone()),
            "POST",
            "/send-bulk",
            Some(json!({ "emails": emails, "subject": "S", "text": "t" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "emails array is required and must not be empty" }));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn send_email_whitespace_fields_are_accepted() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = call(
        app(mailer.clone()),
        "POST",
        "/send-email",
        Some(json!({ "to": "a@x.com", "subject": " ", "text": "\n" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent[0].subject, " ");
}
