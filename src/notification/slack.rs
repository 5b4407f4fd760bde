use super::{ExceptionOccurred, NotificationSink};
use crate::error::{ResponderError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack incoming-webhook payload
#[derive(Debug, Serialize)]
pub struct SlackMessage {
    pub text: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Serialize)]
pub struct SlackAttachment {
    pub color: &'static str,
    pub title: String,
    pub text: String,
    pub fields: Vec<SlackField>,
    pub ts: i64,
}

#[derive(Debug, Serialize)]
pub struct SlackField {
    pub title: &'static str,
    pub value: String,
    pub short: bool,
}

impl From<&ExceptionOccurred> for SlackMessage {
    fn from(notification: &ExceptionOccurred) -> Self {
        let mut fields = vec![
            SlackField {
                title: "Kind",
                value: notification.kind.to_string(),
                short: true,
            },
            SlackField {
                title: "Environment",
                value: notification.environment.to_string(),
                short: true,
            },
            SlackField {
                title: "Incident",
                value: notification.id.to_string(),
                short: false,
            },
        ];
        if let Some(status) = notification.status {
            fields.push(SlackField {
                title: "Status",
                value: status.to_string(),
                short: true,
            });
        }

        SlackMessage {
            text: format!("{} reported an exception", notification.app_name),
            attachments: vec![SlackAttachment {
                color: "danger",
                title: format!("Exception occurred at {}", notification.occurred_at.to_rfc3339()),
                text: notification.message.clone(),
                fields,
                ts: notification.occurred_at.timestamp(),
            }],
        }
    }
}

/// Posts notifications to a Slack incoming webhook
#[derive(Clone)]
pub struct SlackNotifier {
    http: reqwest::Client,
    endpoint: String,
}

impl SlackNotifier {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for SlackNotifier {
    async fn notify(&self, notification: &ExceptionOccurred) -> Result<()> {
        let body = SlackMessage::from(notification);

        let response = self.http.post(&self.endpoint).json(&body).send().await?;

        if response.status().is_success() {
            tracing::debug!(incident = %notification.id, "slack notification delivered");
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status, "slack webhook rejected notification");
            Err(ResponderError::NotificationRejected { status, message })
        }
    }
}
