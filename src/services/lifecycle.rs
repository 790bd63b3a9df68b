//! Periodic refresh that applies the trash lifecycle and raises expiry warnings.
//!
//! Each cycle takes one snapshot of the repository, builds a plan from the
//! policy functions, and applies it only if no user mutation landed in the
//! meantime. Warnings are raised once per snapshot fingerprint, so a quiet
//! refresh on an unchanged day sends nothing.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use super::food_items_service::FoodItemsService;
use crate::error::AppResult;
use crate::models::{FoodItem, Settings};
use crate::notifications::{DispatchReport, NotificationDispatcher};
use crate::policy::{
    auto_delete_summary, compute_auto_deletions, compute_expiry_alerts, compute_imminent_alerts,
    compute_notifications, compute_trash_purge, snapshot_fingerprint,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub auto_deleted: Vec<Uuid>,
    pub purged: Vec<Uuid>,
    pub notifications: DispatchReport,
    /// Push-only alerts for items expiring within three days.
    pub push_alerts: DispatchReport,
    /// Warnings were skipped because nothing changed since the last cycle.
    pub unchanged: bool,
    /// The plan was dropped because a mutation landed after the snapshot.
    pub superseded: bool,
}

pub struct LifecycleWorker {
    service: Arc<FoodItemsService>,
    dispatcher: Arc<NotificationDispatcher>,
    settings: RwLock<Settings>,
    // Held for the whole cycle, so cycles never overlap
    last_fingerprint: Mutex<Option<u64>>,
}

impl LifecycleWorker {
    pub fn new(
        service: Arc<FoodItemsService>,
        dispatcher: Arc<NotificationDispatcher>,
        settings: Settings,
    ) -> Self {
        Self {
            service,
            dispatcher,
            settings: RwLock::new(settings),
            last_fingerprint: Mutex::new(None),
        }
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    pub async fn settings(&self) -> Settings {
        *self.settings.read().await
    }

    /// Replaces the settings. The next cycle re-evaluates warnings even if the
    /// items have not changed.
    pub async fn update_settings(&self, settings: Settings) -> Settings {
        *self.settings.write().await = settings;
        *self.last_fingerprint.lock().await = None;
        tracing::info!("Settings updated: {:?}", settings);
        settings
    }

    pub async fn run_cycle(&self) -> AppResult<CycleReport> {
        let mut last_fingerprint = self.last_fingerprint.lock().await;
        let settings = self.settings().await;
        let mut report = CycleReport::default();

        let generation = self.service.generation();
        let now = self.service.now();
        let active = self.service.list_active().await?;
        let trash = self.service.list_trash().await?;

        let auto_delete = compute_auto_deletions(&active, now, settings.auto_delete_expired);
        let purge = compute_trash_purge(&trash, now, settings.auto_purge_trash);

        // Fingerprint the set as it will look once the deletions land, so the
        // next cycle does not mistake our own deletions for a change
        let remaining: Vec<FoodItem> = active
            .into_iter()
            .filter(|item| !auto_delete.contains(&item.id))
            .collect();
        let fingerprint = snapshot_fingerprint(&remaining, now);

        let mut events = Vec::new();
        let mut push_alerts = Vec::new();
        if *last_fingerprint == Some(fingerprint) {
            report.unchanged = true;
            tracing::debug!("Snapshot unchanged, skipping warnings");
        } else {
            if !settings.auto_delete_expired {
                events.extend(compute_expiry_alerts(&remaining, now));
            }
            events.extend(compute_notifications(&remaining, now, &settings));
            push_alerts = compute_imminent_alerts(&remaining, now);
        }

        if self.service.generation() != generation {
            report.superseded = true;
            tracing::info!("Lifecycle plan superseded by a newer mutation, discarding");
            return Ok(report);
        }

        let mut deleted_names = Vec::new();
        for id in auto_delete {
            match self.service.auto_delete(id).await {
                Ok(Some(item)) => {
                    report.auto_deleted.push(id);
                    deleted_names.push(item.name);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Auto-delete of {} failed: {}", id, e),
            }
        }
        if let Some(summary) = auto_delete_summary(&deleted_names) {
            events.insert(0, summary);
        }

        for id in purge {
            match self.service.purge_expired_trash(id).await {
                Ok(true) => report.purged.push(id),
                Ok(false) => {}
                Err(e) => tracing::warn!("Trash purge of {} failed: {}", id, e),
            }
        }

        *last_fingerprint = Some(fingerprint);
        drop(last_fingerprint);

        report.notifications = self.dispatcher.dispatch_cycle(events, now).await;
        report.push_alerts = self.dispatcher.push_only(push_alerts, now).await;

        tracing::info!(
            "Lifecycle cycle done: {} auto-deleted, {} purged, {} notification(s), {} push alert(s)",
            report.auto_deleted.len(),
            report.purged.len(),
            report.notifications.toasts,
            report.push_alerts.pushed
        );
        Ok(report)
    }

    /// Runs a cycle every `period` until `shutdown` flips to true.
    pub async fn run(self: Arc<Self>, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!("Lifecycle worker started, refreshing every {:?}", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        tracing::error!("Lifecycle cycle failed: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Lifecycle worker stopped");
    }
}
