use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::DeliveryError;
use crate::models::{EventBatch, QueuedEvent};

/// Destination for flushed telemetry batches.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, batch: &[QueuedEvent]) -> Result<(), DeliveryError>;
}

/// Header identifying telemetry posted by this process. The analytics route
/// skips the throttle when it carries the matching token.
pub const TELEMETRY_TOKEN_HEADER: &str = "x-telemetry-token";

// Posts each batch as `{"events": [...]}` to a reporting endpoint
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpSink {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        info!(endpoint = %endpoint, "Telemetry reporting endpoint configured");
        Self {
            client,
            endpoint,
            token: token.into(),
        }
    }
}

#[async_trait]
impl EventSink for HttpSink {
    async fn deliver(&self, batch: &[QueuedEvent]) -> Result<(), DeliveryError> {
        let res = self
            .client
            .post(&self.endpoint)
            .header(TELEMETRY_TOKEN_HEADER, &self.token)
            .json(&EventBatch { events: batch })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(())
    }
}

// No endpoint configured: batches only reach the log
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn deliver(&self, batch: &[QueuedEvent]) -> Result<(), DeliveryError> {
        for event in batch {
            debug!(page = %event.page, event = %event.event, timestamp = %event.timestamp, "Telemetry event");
        }
        info!(count = batch.len(), "Telemetry batch logged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn batch() -> Vec<QueuedEvent> {
        vec![QueuedEvent {
            page: "home".to_string(),
            event: "view".to_string(),
            metadata: Map::new(),
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
        }]
    }

    #[tokio::test]
    async fn log_sink_accepts_every_batch() {
        assert!(LogSink.deliver(&batch()).await.is_ok());
    }

    #[tokio::test]
    async fn http_sink_reports_unreachable_endpoint() {
        let sink = HttpSink::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/api/analytics",
            "token",
        );
        let err = sink.deliver(&batch()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }

    #[test]
    fn batch_body_wraps_events() {
        let events = batch();
        let body = serde_json::to_value(EventBatch { events: &events }).unwrap();
        assert_eq!(body["events"][0]["page"], "home");
        assert_eq!(body["events"][0]["timestamp"], "2024-01-01T00:00:00.000Z");
    }
}
