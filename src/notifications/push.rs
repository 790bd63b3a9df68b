use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::NotificationSink;
use crate::http_client::HttpClient;
use crate::policy::PolicyEvent;

const PUSH_TITLE: &str = "FoodTracker Alert";

/// Forwards notifications to an HTTP endpoint that fans them out to devices.
pub struct WebhookPushSink {
    url: String,
    http_client: HttpClient,
}

impl WebhookPushSink {
    pub fn new(url: impl Into<String>, http_client: HttpClient) -> Self {
        Self {
            url: url.into(),
            http_client,
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookPushSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, event: &PolicyEvent, at: DateTime<Utc>) -> Result<(), String> {
        let payload = serde_json::json!({
            "title": PUSH_TITLE,
            "body": event.message,
            "tag": event.item_id.map(|id| id.to_string()),
            "kind": event.kind,
            "sentAt": at,
        });

        match self.http_client.post_json(&self.url, &payload).await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Push notification sent: {}", event.message);
                Ok(())
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(format!("push webhook returned {}: {}", status, body))
            }
            Err(e) => Err(format!("push webhook unreachable: {}", e)),
        }
    }
}
