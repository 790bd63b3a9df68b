//! Delivery of policy events to the in-app toast feed and push notifications.

pub mod push;
pub mod toast;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::PolicyEvent;

pub use push::WebhookPushSink;
pub use toast::{Toast, ToastFeed};

/// Push permission as reported by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushPermission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl FromStr for PushPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(PushPermission::Default),
            "granted" => Ok(PushPermission::Granted),
            "denied" => Ok(PushPermission::Denied),
            other => Err(format!("unknown push permission '{}'", other)),
        }
    }
}

impl fmt::Display for PushPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PushPermission::Default => "default",
            PushPermission::Granted => "granted",
            PushPermission::Denied => "denied",
        };
        f.write_str(s)
    }
}

/// An outbound channel for notifications beyond the in-app feed.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, event: &PolicyEvent, at: DateTime<Utc>) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub toasts: usize,
    pub pushed: usize,
    pub push_failures: usize,
    pub duplicates: usize,
}

pub struct NotificationDispatcher {
    toasts: Arc<ToastFeed>,
    push: Option<Arc<dyn NotificationSink>>,
    permission: PushPermission,
}

impl NotificationDispatcher {
    pub fn new(
        toasts: Arc<ToastFeed>,
        push: Option<Arc<dyn NotificationSink>>,
        permission: PushPermission,
    ) -> Self {
        Self {
            toasts,
            push,
            permission,
        }
    }

    pub fn toasts(&self) -> &Arc<ToastFeed> {
        &self.toasts
    }

    pub fn permission(&self) -> PushPermission {
        self.permission
    }

    /// Delivers one evaluation cycle's worth of events.
    ///
    /// Within a cycle an event is identified by kind, item and message, so an
    /// exact repeat is dropped while a follow-up reminder with different copy
    /// still goes out. Push failures are logged and counted, never returned.
    pub async fn dispatch_cycle(&self, events: Vec<PolicyEvent>, at: DateTime<Utc>) -> DispatchReport {
        self.deliver_all(events, at, true).await
    }

    /// Sends events to the push sink only. Nothing lands in the toast feed,
    /// and nothing is sent unless push permission is granted.
    pub async fn push_only(&self, events: Vec<PolicyEvent>, at: DateTime<Utc>) -> DispatchReport {
        self.deliver_all(events, at, false).await
    }

    fn granted_sink(&self) -> Option<&Arc<dyn NotificationSink>> {
        match (&self.push, self.permission) {
            (Some(sink), PushPermission::Granted) => Some(sink),
            (Some(_), permission) => {
                tracing::debug!("Push notifications skipped, permission is {}", permission);
                None
            }
            (None, _) => None,
        }
    }

    async fn deliver_all(
        &self,
        events: Vec<PolicyEvent>,
        at: DateTime<Utc>,
        toast: bool,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut seen = HashSet::new();
        let push = self.granted_sink();

        for event in events {
            if !seen.insert((event.kind, event.item_id, event.message.clone())) {
                report.duplicates += 1;
                continue;
            }

            if toast {
                self.toasts.push(&event, at);
                report.toasts += 1;
            }

            if let Some(sink) = push {
                match sink.deliver(&event, at).await {
                    Ok(()) => report.pushed += 1,
                    Err(e) => {
                        report.push_failures += 1;
                        tracing::warn!("{} push failed for '{}': {}", sink.name(), event.message, e);
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::EventKind;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn deliver(&self, event: &PolicyEvent, _at: DateTime<Utc>) -> Result<(), String> {
            if self.fail {
                return Err("offline".to_string());
            }
            self.delivered.lock().unwrap().push(event.message.clone());
            Ok(())
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap()
    }

    fn warn3(id: Uuid, message: &str) -> PolicyEvent {
        PolicyEvent {
            kind: EventKind::Warn3,
            item_id: Some(id),
            item_name: Some("Tofu".to_string()),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicates_dropped_but_reminders_kept() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(
            Arc::new(ToastFeed::default()),
            Some(sink.clone() as Arc<dyn NotificationSink>),
            PushPermission::Granted,
        );
        let id = Uuid::new_v4();
        let events = vec![
            warn3(id, "Tofu expires in 3 days!"),
            warn3(id, "Please double check again !"),
            warn3(id, "Tofu expires in 3 days!"),
        ];

        let report = dispatcher.dispatch_cycle(events, at()).await;
        assert_eq!(report.toasts, 2);
        assert_eq!(report.pushed, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(
            *sink.delivered.lock().unwrap(),
            vec!["Tofu expires in 3 days!", "Please double check again !"]
        );

        // A new cycle may send the same event again
        let report = dispatcher
            .dispatch_cycle(vec![warn3(id, "Tofu expires in 3 days!")], at())
            .await;
        assert_eq!(report.toasts, 1);
        assert_eq!(dispatcher.toasts().len(), 3);
    }

    #[tokio::test]
    async fn test_push_requires_granted_permission() {
        for permission in [PushPermission::Default, PushPermission::Denied] {
            let sink = Arc::new(RecordingSink::default());
            let dispatcher = NotificationDispatcher::new(
                Arc::new(ToastFeed::default()),
                Some(sink.clone() as Arc<dyn NotificationSink>),
                permission,
            );
            let report = dispatcher
                .dispatch_cycle(vec![warn3(Uuid::new_v4(), "x")], at())
                .await;
            assert_eq!(report.toasts, 1);
            assert_eq!(report.pushed, 0);
            assert!(sink.delivered.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_push_failure_is_counted() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..RecordingSink::default()
        });
        let dispatcher = NotificationDispatcher::new(
            Arc::new(ToastFeed::default()),
            Some(sink as Arc<dyn NotificationSink>),
            PushPermission::Granted,
        );
        let report = dispatcher
            .dispatch_cycle(vec![warn3(Uuid::new_v4(), "x")], at())
            .await;
        assert_eq!(report.toasts, 1);
        assert_eq!(report.push_failures, 1);
    }

    #[tokio::test]
    async fn test_push_only_skips_toast_feed() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(
            Arc::new(ToastFeed::default()),
            Some(sink.clone() as Arc<dyn NotificationSink>),
            PushPermission::Granted,
        );
        let alert = PolicyEvent {
            kind: EventKind::ExpiringSoon,
            item_id: Some(Uuid::new_v4()),
            item_name: Some("Milk".to_string()),
            message: "Milk expires today!".to_string(),
        };

        let report = dispatcher.push_only(vec![alert], at()).await;
        assert_eq!(report.pushed, 1);
        assert_eq!(report.toasts, 0);
        assert!(dispatcher.toasts().is_empty());
        assert_eq!(*sink.delivered.lock().unwrap(), vec!["Milk expires today!"]);
    }

    #[test]
    fn test_parse_permission() {
        assert_eq!("Granted".parse::<PushPermission>(), Ok(PushPermission::Granted));
        assert!("maybe".parse::<PushPermission>().is_err());
    }
}
