//! Alert delivery for a single finished record: chat webhook and email.
//!
//! Senders only read the record. Whether delivery succeeds has no effect on
//! what is stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sentinel_core::{FeedbackRecord, Sentiment, Urgency};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::NotifyError;

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
pub const DEFAULT_FROM: &str = "SentinelAI <onboarding@resend.dev>";

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, record: &FeedbackRecord) -> Result<(), NotifyError>;
}

/// The first HIGH urgency record, in the given order.
pub fn first_urgent(records: &[FeedbackRecord]) -> Result<&FeedbackRecord, NotifyError> {
    records
        .iter()
        .find(|r| r.urgency == Some(Urgency::High))
        .ok_or(NotifyError::NothingUrgent)
}

fn urgency_label(record: &FeedbackRecord) -> &'static str {
    record.urgency.map(|u| u.as_str()).unwrap_or("LOW")
}

fn sentiment_label(record: &FeedbackRecord) -> String {
    record
        .sentiment
        .map(|s| s.as_str().to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".into())
}

async fn check_status(
    resp: reqwest::Response,
    service: &'static str,
) -> Result<reqwest::Response, NotifyError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    warn!(service, status = status.as_u16(), "alert delivery rejected");
    Err(NotifyError::Server {
        service,
        status: status.as_u16(),
        body,
    })
}

// ── Chat webhook ──

pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

/// Block Kit message for one record.
pub fn slack_payload(record: &FeedbackRecord, sent_at: DateTime<Utc>) -> Value {
    let urgency = urgency_label(record);
    let urgency_marker = match record.urgency {
        Some(Urgency::High) => "🚨",
        Some(Urgency::Medium) => "⚠️",
        _ => "ℹ️",
    };
    let sentiment_marker = match record.sentiment {
        Some(Sentiment::Positive) => "😊",
        Some(Sentiment::Negative) => "😞",
        _ => "😐",
    };

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("{urgency_marker} New {urgency} Priority Feedback"),
                "emoji": true
            }
        }),
        json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*Source:*\n{}", record.source.as_str().to_uppercase()) },
                { "type": "mrkdwn", "text": format!("*Author:*\n{}", record.author) },
                { "type": "mrkdwn", "text": format!("*Sentiment:* {sentiment_marker}\n{}", sentiment_label(record)) },
                { "type": "mrkdwn", "text": format!("*Urgency:*\n{urgency}") }
            ]
        }),
        mrkdwn_section(format!("*Feedback:*\n_{}_", record.text)),
    ];

    if !record.keywords.is_empty() {
        blocks.push(mrkdwn_section(format!(
            "*Keywords:* {}",
            record.keywords.join(", ")
        )));
    }
    if let Some(response) = &record.suggested_response {
        blocks.push(mrkdwn_section(format!(
            "*AI Suggested Response:*\n{response}"
        )));
    }
    blocks.push(mrkdwn_section(format!(
        "_Automated alert from SentinelAI | {}_",
        sent_at.format("%Y-%m-%d %H:%M:%S UTC")
    )));

    json!({ "blocks": blocks })
}

fn mrkdwn_section(text: String) -> Value {
    json!({ "type": "section", "text": { "type": "mrkdwn", "text": text } })
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, record: &FeedbackRecord) -> Result<(), NotifyError> {
        let url = self
            .webhook_url
            .as_deref()
            .ok_or(NotifyError::MissingCredential("SLACK_WEBHOOK_URL"))?;

        let payload = slack_payload(record, Utc::now());
        let resp = self.client.post(url).json(&payload).send().await?;
        check_status(resp, "slack").await?;
        info!(record = %record.id, "slack alert sent");
        Ok(())
    }
}

// ── Email ──

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub from: String,
    pub endpoint: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from: DEFAULT_FROM.into(),
            endpoint: RESEND_ENDPOINT.into(),
        }
    }
}

#[derive(Deserialize)]
struct EmailResponse {
    id: Option<String>,
}

pub struct EmailNotifier {
    client: reqwest::Client,
    config: EmailConfig,
    recipient: String,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig, recipient: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            recipient: recipient.into(),
        }
    }
}

/// Only checks for an `@`; the mail provider does real validation.
pub fn validate_recipient(address: &str) -> Result<(), NotifyError> {
    if address.contains('@') {
        Ok(())
    } else {
        Err(NotifyError::InvalidRecipient(address.to_string()))
    }
}

pub fn email_subject(record: &FeedbackRecord) -> String {
    match record.urgency {
        Some(Urgency::High) => format!(
            "🚨 URGENT: Critical Feedback Alert from {}",
            record.source
        ),
        _ => format!(
            "⚠️ New {} Priority Feedback from {}",
            urgency_label(record),
            record.source
        ),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn email_html(record: &FeedbackRecord) -> String {
    let accent = match record.urgency {
        Some(Urgency::High) => "#ef4444",
        Some(Urgency::Medium) => "#f59e0b",
        _ => "#10b981",
    };

    let mut html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h1>SentinelAI Alert</h1>
<p>Real-time Customer Sentiment Monitoring</p>
<div style="border-left: 4px solid {accent}; padding: 20px;">
<h2>Feedback Details</h2>
<p><strong>Source:</strong> {source}</p>
<p><strong>Author:</strong> {author}</p>
<p><strong>Sentiment:</strong> {sentiment}</p>
<p><strong>Urgency:</strong> {urgency}</p>
<p><strong>Feedback Text:</strong><br>{text}</p>
"#,
        source = record.source.as_str().to_uppercase(),
        author = escape_html(&record.author),
        sentiment = sentiment_label(record),
        urgency = urgency_label(record),
        text = escape_html(&record.text),
    );

    if !record.keywords.is_empty() {
        let tags: Vec<String> = record
            .keywords
            .iter()
            .map(|k| format!("<span>{}</span>", escape_html(k)))
            .collect();
        html.push_str(&format!(
            "<p><strong>Keywords:</strong> {}</p>\n",
            tags.join(" ")
        ));
    }
    if let Some(response) = &record.suggested_response {
        html.push_str(&format!(
            "<p><strong>AI Suggested Response:</strong><br><em>{}</em></p>\n",
            escape_html(response)
        ));
    }
    html.push_str(
        "</div>\n<p>This is an automated alert from SentinelAI</p>\n\
         <p>Login to your dashboard for more details and actions</p>\n</div>",
    );
    html
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, record: &FeedbackRecord) -> Result<(), NotifyError> {
        validate_recipient(&self.recipient)?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(NotifyError::MissingCredential("RESEND_API_KEY"))?;

        let body = json!({
            "from": self.config.from,
            "to": [self.recipient],
            "subject": email_subject(record),
            "html": email_html(record),
        });
        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp, "resend").await?;
        let sent: EmailResponse = resp.json().await?;
        info!(
            record = %record.id,
            email_id = sent.id.as_deref().unwrap_or("-"),
            "email alert sent"
        );
        Ok(())
    }
}
