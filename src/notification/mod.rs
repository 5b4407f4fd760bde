//! Operational notifications for reported faults
//!
//! A reported fault becomes an [`ExceptionOccurred`] notification that is
//! handed to a [`NotificationSink`]. The crate ships a Slack webhook sink and
//! a log-only sink used when no webhook is configured.

use crate::config::{Environment, ResponderConfig};
use crate::error::Result;
use crate::fault::{Fault, FaultKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub mod slack;

pub use slack::SlackNotifier;

/// Notification sent when a reportable fault occurs in production
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionOccurred {
    pub id: Uuid,
    pub kind: FaultKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub environment: Environment,
    pub app_name: String,
    pub occurred_at: DateTime<Utc>,
}

impl ExceptionOccurred {
    pub fn new(fault: &Fault, environment: Environment, app_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: fault.kind(),
            message: fault.message().to_string(),
            status: fault.status(),
            environment,
            app_name: app_name.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// External channel that receives operational alerts
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn notify(&self, notification: &ExceptionOccurred) -> Result<()>;
}

/// Sink that only writes the notification to the log
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, notification: &ExceptionOccurred) -> Result<()> {
        tracing::warn!(
            incident = %notification.id,
            kind = %notification.kind,
            environment = %notification.environment,
            "exception occurred: {}",
            notification.message
        );
        Ok(())
    }
}

/// Pick the sink for a configuration: Slack when an endpoint is set,
/// otherwise the log.
pub fn sink_for(config: &ResponderConfig) -> Result<Arc<dyn NotificationSink>> {
    match &config.slack_endpoint {
        Some(endpoint) => Ok(Arc::new(SlackNotifier::new(endpoint.clone())?)),
        None => {
            tracing::debug!("services.slack.endpoint not set, notifications go to the log");
            Ok(Arc::new(LogNotifier))
        }
    }
}
