//! Expiry and trash lifecycle rules.
//!
//! Everything here is a pure function of an item snapshot, the current
//! [`Settings`] and an explicit `now`. The HTTP handlers and the lifecycle
//! worker both go through this module so the 15-day password gate and the
//! expiry math live in exactly one place.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::expiry::{days_until_expiry, days_until_trash_clear, DANGER_MAX_DAYS, WARNING_MAX_DAYS};
use crate::models::{FoodItem, Settings};

/// Maximum number of names spelled out in the auto-delete summary.
const SUMMARY_NAME_LIMIT: usize = 3;

/// The shared admin password, either as plain text or an argon2 PHC hash.
#[derive(Clone)]
pub enum AdminSecret {
    Plain(String),
    Argon2(String),
}

impl AdminSecret {
    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            AdminSecret::Plain(expected) => {
                Sha256::digest(expected.as_bytes()) == Sha256::digest(candidate.as_bytes())
            }
            AdminSecret::Argon2(hash) => {
                let Ok(parsed) = PasswordHash::new(hash) else {
                    tracing::warn!("ADMIN_PASSWORD_HASH is not a valid argon2 hash");
                    return false;
                };
                Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok()
            }
        }
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminSecret::Plain(_) => f.write_str("AdminSecret::Plain(***)"),
            AdminSecret::Argon2(_) => f.write_str("AdminSecret::Argon2(***)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Edit,
    Delete,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Edit => f.write_str("edit"),
            Mutation::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    PasswordRequired,
    PasswordInvalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    #[serde(rename = "WARN_15")]
    Warn15,
    #[serde(rename = "WARN_8")]
    Warn8,
    #[serde(rename = "WARN_3")]
    Warn3,
    #[serde(rename = "EXPIRING_SOON")]
    ExpiringSoon,
    #[serde(rename = "EXPIRED")]
    Expired,
    #[serde(rename = "AUTO_DELETED")]
    AutoDeleted,
}

/// A logical notification. Delivery is the dispatcher's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyEvent {
    pub kind: EventKind,
    pub item_id: Option<Uuid>,
    pub item_name: Option<String>,
    pub message: String,
}

impl PolicyEvent {
    fn for_item(kind: EventKind, item: &FoodItem, message: String) -> Self {
        Self {
            kind,
            item_id: Some(item.id),
            item_name: Some(item.name.clone()),
            message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolicyEngine {
    admin_secret: Option<AdminSecret>,
}

impl PolicyEngine {
    pub fn new(admin_secret: Option<AdminSecret>) -> Self {
        Self { admin_secret }
    }

    /// Items more than 15 days from expiry are gated behind the admin password.
    pub fn requires_password(item: &FoodItem, now: DateTime<Utc>) -> bool {
        days_until_expiry(item.expiry_date, now) > WARNING_MAX_DAYS
    }

    /// `item` must be the freshly persisted state, not a client copy.
    pub fn authorize_mutation(
        &self,
        item: &FoodItem,
        mutation: Mutation,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Authorization> {
        if !Self::requires_password(item, now) {
            return Ok(Authorization::Authorized);
        }

        let secret = self.admin_secret.as_ref().ok_or_else(|| {
            tracing::error!(
                "Refusing gated {} of {}: admin password not configured",
                mutation,
                item.id
            );
            AppError::Configuration("Admin password not configured".to_string())
        })?;

        let decision = match password.filter(|p| !p.is_empty()) {
            None => Authorization::PasswordRequired,
            Some(candidate) if secret.verify(candidate) => Authorization::Authorized,
            Some(_) => Authorization::PasswordInvalid,
        };
        tracing::debug!("Gated {} of {}: {:?}", mutation, item.id, decision);
        Ok(decision)
    }

    pub fn verify_password(&self, candidate: &str) -> AppResult<bool> {
        let secret = self
            .admin_secret
            .as_ref()
            .ok_or_else(|| AppError::Configuration("Admin password not configured".to_string()))?;
        Ok(secret.verify(candidate))
    }
}

/// Consistent items in the requested deletion state. Invariant violations are
/// logged and skipped.
fn usable<'a>(items: &'a [FoodItem], deleted: bool) -> impl Iterator<Item = &'a FoodItem> {
    items.iter().filter(move |item| {
        if !item.is_consistent() {
            tracing::warn!(
                "Skipping food item {} with inconsistent deletion state (is_deleted={}, deleted_at={:?})",
                item.id,
                item.is_deleted,
                item.deleted_at
            );
            return false;
        }
        item.is_deleted == deleted
    })
}

/// Active items expired by at least one full calendar day.
pub fn compute_auto_deletions(
    items: &[FoodItem],
    now: DateTime<Utc>,
    auto_delete_enabled: bool,
) -> Vec<Uuid> {
    if !auto_delete_enabled {
        return Vec::new();
    }
    usable(items, false)
        .filter(|item| days_until_expiry(item.expiry_date, now) < 0)
        .map(|item| item.id)
        .collect()
}

/// Alerts surfaced instead of auto-deleting when auto-delete is off.
pub fn compute_expiry_alerts(items: &[FoodItem], now: DateTime<Utc>) -> Vec<PolicyEvent> {
    usable(items, false)
        .filter(|item| days_until_expiry(item.expiry_date, now) <= 0)
        .map(|item| {
            PolicyEvent::for_item(
                EventKind::Expired,
                item,
                format!("{} has expired!", item.name),
            )
        })
        .collect()
}

pub fn auto_delete_summary(names: &[String]) -> Option<PolicyEvent> {
    if names.is_empty() {
        return None;
    }
    let shown = names
        .iter()
        .take(SUMMARY_NAME_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let message = if names.len() > SUMMARY_NAME_LIMIT {
        format!(
            "Auto-deleted: {} and {} more",
            shown,
            names.len() - SUMMARY_NAME_LIMIT
        )
    } else {
        format!("Auto-deleted: {}", shown)
    };

    Some(PolicyEvent {
        kind: EventKind::AutoDeleted,
        item_id: None,
        item_name: None,
        message,
    })
}

/// On-the-day warnings for items exactly 3, 8 or 15 days out.
///
/// The 3-day and 15-day warnings are each followed by a second reminder with
/// different copy for the same item and kind.
pub fn compute_notifications(
    items: &[FoodItem],
    now: DateTime<Utc>,
    settings: &Settings,
) -> Vec<PolicyEvent> {
    let due = |days: i64| {
        usable(items, false)
            .filter(|item| days_until_expiry(item.expiry_date, now) == days)
            .collect::<Vec<_>>()
    };

    let mut events = Vec::new();

    if settings.warning_days_3 {
        let three = due(3);
        events.extend(three.iter().map(|item| {
            PolicyEvent::for_item(
                EventKind::Warn3,
                item,
                format!("{} expires in 3 days!", item.name),
            )
        }));
        events.extend(three.iter().map(|item| {
            PolicyEvent::for_item(
                EventKind::Warn3,
                item,
                "Please double check again !".to_string(),
            )
        }));
    }

    events.extend(due(8).into_iter().map(|item| {
        PolicyEvent::for_item(
            EventKind::Warn8,
            item,
            format!("{} expires in 8 days!", item.name),
        )
    }));

    if settings.warning_days_15 {
        let fifteen = due(15);
        events.extend(fifteen.iter().map(|item| {
            PolicyEvent::for_item(
                EventKind::Warn15,
                item,
                format!("{} expires in 15 days", item.name),
            )
        }));
        events.extend(fifteen.iter().map(|item| {
            PolicyEvent::for_item(
                EventKind::Warn15,
                item,
                "Stand by dont forget to stock out !".to_string(),
            )
        }));
    }

    events
}

/// Push alerts for every active item expiring within the next 3 days,
/// today included. Unlike the on-the-day warnings these repeat for each
/// snapshot, so a push device keeps hearing about an item until it is gone.
pub fn compute_imminent_alerts(items: &[FoodItem], now: DateTime<Utc>) -> Vec<PolicyEvent> {
    usable(items, false)
        .filter_map(|item| {
            let days = days_until_expiry(item.expiry_date, now);
            let message = match days {
                0 => format!("{} expires today!", item.name),
                1 => format!("{} expires in 1 day!", item.name),
                d if (2..=DANGER_MAX_DAYS).contains(&d) => {
                    format!("{} expires in {} days!", item.name, d)
                }
                _ => return None,
            };
            Some(PolicyEvent::for_item(EventKind::ExpiringSoon, item, message))
        })
        .collect()
}

/// Trashed items whose 30-day retention has run out.
pub fn compute_trash_purge(
    items: &[FoodItem],
    now: DateTime<Utc>,
    auto_purge_enabled: bool,
) -> Vec<Uuid> {
    if !auto_purge_enabled {
        return Vec::new();
    }
    usable(items, true)
        .filter_map(|item| item.deleted_at.map(|at| (item.id, at)))
        .filter(|(_, deleted_at)| days_until_trash_clear(*deleted_at, now) <= 0)
        .map(|(id, _)| id)
        .collect()
}

/// Changes when the item set changes or the UTC calendar day rolls over.
pub fn snapshot_fingerprint(items: &[FoodItem], now: DateTime<Utc>) -> u64 {
    let mut keys: Vec<_> = items
        .iter()
        .map(|item| (item.id, item.name.as_str(), item.expiry_date, item.is_deleted))
        .collect();
    keys.sort();

    let mut hasher = DefaultHasher::new();
    keys.hash(&mut hasher);
    now.date_naive().hash(&mut hasher);
    hasher.finish()
}
