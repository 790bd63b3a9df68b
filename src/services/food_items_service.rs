use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::FoodItemRepository;
use crate::error::{AppError, AppResult};
use crate::expiry::{
    classify, days_until_expiry, days_until_trash_clear, parse_instant, ExpiryStatus,
};
use crate::models::{
    duplicate_key, FoodItem, FoodItemPatch, InsertFoodItemRequest, NewFoodItem,
    UpdateFoodItemRequest,
};
use crate::policy::{Authorization, Mutation, PolicyEngine};

/// Items this close to expiry count as "expiring soon" in the stats.
const EXPIRING_SOON_DAYS: i64 = 7;

const NOT_FOUND: &str = "Food item not found";

/// One async mutex per item id so mutations on the same item run one at a time.
#[derive(Default)]
struct ItemLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl ItemLocks {
    async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodStats {
    pub total_active: usize,
    pub in_trash: usize,
    pub expiring_soon: usize,
    pub expired: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_category: BTreeMap<&'static str, usize>,
}

pub struct FoodItemsService {
    repo: Arc<dyn FoodItemRepository>,
    policy: PolicyEngine,
    clock: Arc<dyn Clock>,
    locks: ItemLocks,
    repository_timeout: Duration,
    generation: AtomicU64,
}

impl FoodItemsService {
    pub fn new(
        repo: Arc<dyn FoodItemRepository>,
        policy: PolicyEngine,
        clock: Arc<dyn Clock>,
        repository_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            policy,
            clock,
            locks: ItemLocks::default(),
            repository_timeout,
            generation: AtomicU64::new(0),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Bumped after every successful mutation. A lifecycle plan built from an
    /// older generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Runs a repository call under the configured deadline. A call that
    /// overruns is reported as failed and never retried.
    async fn bounded<T>(&self, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        tokio::time::timeout(self.repository_timeout, call)
            .await
            .map_err(|_| {
                tracing::error!(
                    "Repository call exceeded {:?}, aborting",
                    self.repository_timeout
                );
                AppError::Timeout
            })?
    }

    pub async fn list_active(&self) -> AppResult<Vec<FoodItem>> {
        self.bounded(self.repo.list(false)).await
    }

    pub async fn list_trash(&self) -> AppResult<Vec<FoodItem>> {
        self.bounded(self.repo.list(true)).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<FoodItem> {
        self.bounded(self.repo.get(id))
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn create(&self, req: InsertFoodItemRequest) -> AppResult<FoodItem> {
        let now = self.now();
        let name = validate_name(&req.name)?;
        let expiry_date = validate_expiry(&req.expiry_date)?;
        ensure_not_past(expiry_date, now)?;

        let active = self.list_active().await?;
        ensure_unique(&active, None, &name, expiry_date)?;

        let item = NewFoodItem {
            name,
            expiry_date,
            category: req.category.unwrap_or_default(),
            notes: normalize_notes(req.notes),
        };
        let created = self.bounded(self.repo.create(item, now)).await?;
        self.bump_generation();

        tracing::info!("Created food item {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, req: UpdateFoodItemRequest) -> AppResult<FoodItem> {
        let _guard = self.locks.acquire(id).await;

        // Gate on what is stored now, not on what the client last saw
        let current = self.get(id).await?;
        self.authorize(&current, Mutation::Edit, req.admin_password.as_deref())?;

        let patch = FoodItemPatch {
            name: req.name.as_deref().map(validate_name).transpose()?,
            expiry_date: req.expiry_date.as_deref().map(validate_expiry).transpose()?,
            category: req.category,
            notes: req.notes.map(normalize_notes),
        };
        if let Some(expiry_date) = patch.expiry_date {
            ensure_not_past(expiry_date, self.now())?;
        }

        if current.is_active() {
            let mut candidate = current.clone();
            patch.apply_to(&mut candidate);
            let active = self.list_active().await?;
            ensure_unique(&active, Some(id), &candidate.name, candidate.expiry_date)?;
        }

        let updated = self
            .bounded(self.repo.update(id, patch))
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
        self.bump_generation();

        tracing::info!("Updated food item {}", id);
        Ok(updated)
    }

    /// Moves an item to the trash after the password gate.
    pub async fn delete(&self, id: Uuid, admin_password: Option<&str>) -> AppResult<()> {
        let _guard = self.locks.acquire(id).await;

        let current = self.get(id).await?;
        self.authorize(&current, Mutation::Delete, admin_password)?;

        if !self.bounded(self.repo.soft_delete(id, self.now())).await? {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }
        self.bump_generation();

        tracing::info!("Moved food item {} to trash", id);
        Ok(())
    }

    /// System-initiated trashing of an expired item. Expiry is the
    /// authorization, so the item is re-checked under its lock first.
    /// Returns the trashed item, or `None` if it no longer qualifies.
    pub async fn auto_delete(&self, id: Uuid) -> AppResult<Option<FoodItem>> {
        let _guard = self.locks.acquire(id).await;

        let Some(current) = self.bounded(self.repo.get(id)).await? else {
            return Ok(None);
        };
        let now = self.now();
        if !current.is_active() || days_until_expiry(current.expiry_date, now) >= 0 {
            tracing::debug!("Food item {} no longer due for auto-delete", id);
            return Ok(None);
        }

        if !self.bounded(self.repo.soft_delete(id, now)).await? {
            return Ok(None);
        }
        self.bump_generation();

        tracing::info!("Auto-deleted expired food item {} ({})", id, current.name);
        Ok(Some(current))
    }

    pub async fn restore(&self, id: Uuid) -> AppResult<()> {
        let _guard = self.locks.acquire(id).await;

        if !self.bounded(self.repo.restore(id)).await? {
            return Err(AppError::NotFound(
                "Food item not found or not deleted".to_string(),
            ));
        }
        self.bump_generation();

        tracing::info!("Restored food item {}", id);
        Ok(())
    }

    pub async fn purge(&self, id: Uuid) -> AppResult<()> {
        let _guard = self.locks.acquire(id).await;

        if !self.bounded(self.repo.purge(id)).await? {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }
        self.bump_generation();

        tracing::info!("Permanently deleted food item {}", id);
        Ok(())
    }

    /// Purges a trashed item whose retention window has run out. Returns
    /// whether it was removed.
    pub async fn purge_expired_trash(&self, id: Uuid) -> AppResult<bool> {
        let _guard = self.locks.acquire(id).await;

        let Some(current) = self.bounded(self.repo.get(id)).await? else {
            return Ok(false);
        };
        let now = self.now();
        let due = current
            .deleted_at
            .is_some_and(|at| days_until_trash_clear(at, now) <= 0);
        if !current.is_deleted || !due {
            return Ok(false);
        }

        let purged = self.bounded(self.repo.purge(id)).await?;
        if purged {
            self.bump_generation();
            tracing::info!("Auto-purged food item {} from trash", id);
        }
        Ok(purged)
    }

    pub async fn clear_trash(&self) -> AppResult<u64> {
        let cleared = self.bounded(self.repo.clear_trash()).await?;
        if cleared > 0 {
            self.bump_generation();
        }
        Ok(cleared)
    }

    pub fn verify_password(&self, password: &str) -> AppResult<bool> {
        self.policy.verify_password(password)
    }

    pub async fn stats(&self) -> AppResult<FoodStats> {
        let active = self.list_active().await?;
        let trash = self.list_trash().await?;
        Ok(summarize(&active, trash.len(), self.now()))
    }

    fn authorize(
        &self,
        item: &FoodItem,
        mutation: Mutation,
        password: Option<&str>,
    ) -> AppResult<()> {
        match self
            .policy
            .authorize_mutation(item, mutation, password, self.now())?
        {
            Authorization::Authorized => Ok(()),
            Authorization::PasswordRequired => {
                tracing::warn!("Rejected {} of {}: admin password required", mutation, item.id);
                Err(AppError::Authorization(
                    "Admin password required".to_string(),
                ))
            }
            Authorization::PasswordInvalid => {
                tracing::warn!("Rejected {} of {}: invalid admin password", mutation, item.id);
                Err(AppError::Authorization(
                    "Invalid admin password".to_string(),
                ))
            }
        }
    }
}

fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    Ok(name.to_string())
}

fn validate_expiry(raw: &str) -> AppResult<DateTime<Utc>> {
    parse_instant(raw)
        .ok_or_else(|| AppError::Validation(format!("Invalid expiry date '{}'", raw)))
}

fn ensure_not_past(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if expiry_date.date_naive() < now.date_naive() {
        return Err(AppError::Validation(
            "Expiry date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Rejects a second active item with the same name expiring on the same day.
fn ensure_unique(
    active: &[FoodItem],
    exclude: Option<Uuid>,
    name: &str,
    expiry_date: DateTime<Utc>,
) -> AppResult<()> {
    let key = duplicate_key(name, expiry_date);
    let clash = active
        .iter()
        .filter(|item| Some(item.id) != exclude)
        .any(|item| item.duplicate_key() == key);

    if clash {
        return Err(AppError::Validation(format!(
            "An item named '{}' already expires on {}",
            name,
            expiry_date.format("%Y-%m-%d")
        )));
    }
    Ok(())
}

fn summarize(active: &[FoodItem], in_trash: usize, now: DateTime<Utc>) -> FoodStats {
    let mut by_status = BTreeMap::new();
    let mut by_category = BTreeMap::new();
    let mut expiring_soon = 0;
    let mut expired = 0;

    for item in active {
        let days = days_until_expiry(item.expiry_date, now);
        if days < 0 {
            expired += 1;
        } else if days <= EXPIRING_SOON_DAYS {
            expiring_soon += 1;
        }

        let status = match classify(days) {
            ExpiryStatus::Danger => "danger",
            ExpiryStatus::Warning => "warning",
            ExpiryStatus::Safe => "safe",
        };
        *by_status.entry(status).or_insert(0) += 1;
        *by_category.entry(item.category.as_str()).or_insert(0) += 1;
    }

    FoodStats {
        total_active: active.len(),
        in_trash,
        expiring_soon,
        expired,
        by_status,
        by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::MemoryFoodItemRepository;
    use crate::models::Category;
    use crate::policy::AdminSecret;
    use chrono::{Duration as ChronoDuration, TimeZone};

    const PASSWORD: &str = "letmein";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()
    }

    fn setup() -> (FoodItemsService, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(start()));
        let service = FoodItemsService::new(
            Arc::new(MemoryFoodItemRepository::new()),
            PolicyEngine::new(Some(AdminSecret::Plain(PASSWORD.to_string()))),
            clock.clone(),
            Duration::from_secs(5),
        );
        (service, clock)
    }

    fn insert(name: &str, days: i64) -> InsertFoodItemRequest {
        InsertFoodItemRequest {
            name: name.to_string(),
            expiry_date: (start() + ChronoDuration::days(days)).to_rfc3339(),
            category: None,
            notes: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let (service, _) = setup();

        let blank = InsertFoodItemRequest {
            name: "   ".to_string(),
            ..insert("x", 3)
        };
        assert!(matches!(service.create(blank).await, Err(AppError::Validation(_))));

        let bad_date = InsertFoodItemRequest {
            expiry_date: "soon".to_string(),
            ..insert("Milk", 3)
        };
        assert!(matches!(service.create(bad_date).await, Err(AppError::Validation(_))));

        assert!(matches!(
            service.create(insert("Milk", -1)).await,
            Err(AppError::Validation(_))
        ));

        let created = service.create(insert(" Milk ", 3)).await.unwrap();
        assert_eq!(created.name, "Milk");
        assert_eq!(created.category, Category::Uncategorized);
        assert_eq!(created.notes, None);
    }

    #[tokio::test]
    async fn test_duplicate_active_items_rejected() {
        let (service, _) = setup();
        let first = service.create(insert("Milk", 3)).await.unwrap();

        assert!(matches!(
            service.create(insert("MILK", 3)).await,
            Err(AppError::Validation(_))
        ));
        // Another day is fine
        service.create(insert("milk", 4)).await.unwrap();

        // Once trashed, the pair is free again
        service.delete(first.id, None).await.unwrap();
        service.create(insert("Milk", 3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_gated_by_current_expiry() {
        let (service, _) = setup();
        let far = service.create(insert("Rice", 20)).await.unwrap();

        let rename = |password: Option<&str>| UpdateFoodItemRequest {
            name: Some("Brown rice".to_string()),
            admin_password: password.map(str::to_string),
            ..UpdateFoodItemRequest::default()
        };

        assert!(matches!(
            service.update(far.id, rename(None)).await,
            Err(AppError::Authorization(msg)) if msg == "Admin password required"
        ));
        assert!(matches!(
            service.update(far.id, rename(Some("nope"))).await,
            Err(AppError::Authorization(msg)) if msg == "Invalid admin password"
        ));
        let updated = service.update(far.id, rename(Some(PASSWORD))).await.unwrap();
        assert_eq!(updated.name, "Brown rice");
    }

    #[tokio::test]
    async fn test_update_rejects_past_expiry() {
        let (service, _) = setup();
        let item = service.create(insert("Milk", 4)).await.unwrap();

        let backdate = UpdateFoodItemRequest {
            expiry_date: Some("2020-01-01".to_string()),
            ..UpdateFoodItemRequest::default()
        };
        assert!(matches!(
            service.update(item.id, backdate).await,
            Err(AppError::Validation(msg)) if msg == "Expiry date cannot be in the past"
        ));
        assert_eq!(service.get(item.id).await.unwrap().expiry_date, item.expiry_date);

        // Earlier today is still today
        let today = UpdateFoodItemRequest {
            expiry_date: Some("2026-08-01T00:00:00Z".to_string()),
            ..UpdateFoodItemRequest::default()
        };
        service.update(item.id, today).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_notes_clear_and_keep() {
        let (service, _) = setup();
        let item = service.create(insert("Jam", 2)).await.unwrap();

        let set = |notes: Option<Option<&str>>| UpdateFoodItemRequest {
            notes: notes.map(|n| n.map(str::to_string)),
            ..UpdateFoodItemRequest::default()
        };
        let noted = service.update(item.id, set(Some(Some("fridge")))).await.unwrap();
        assert_eq!(noted.notes.as_deref(), Some("fridge"));
        let kept = service.update(item.id, set(None)).await.unwrap();
        assert_eq!(kept.notes.as_deref(), Some("fridge"));
        let cleared = service.update(item.id, set(Some(None))).await.unwrap();
        assert_eq!(cleared.notes, None);
    }

    #[tokio::test]
    async fn test_gate_follows_clock_not_request() {
        let (service, clock) = setup();
        let item = service.create(insert("Beans", 16)).await.unwrap();
        assert!(service.delete(item.id, None).await.is_err());

        // A day later the item is inside the 15-day window
        clock.advance(ChronoDuration::days(1));
        service.delete(item.id, None).await.unwrap();
        assert!(service.get(item.id).await.unwrap().is_deleted);
    }

    #[tokio::test]
    async fn test_missing_items_are_not_found() {
        let (service, _) = setup();
        let id = Uuid::new_v4();
        assert!(matches!(service.get(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(id, None).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.update(id, UpdateFoodItemRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.purge(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_restore_requires_trashed_item() {
        let (service, _) = setup();
        let item = service.create(insert("Jam", 5)).await.unwrap();

        assert!(matches!(service.restore(item.id).await, Err(AppError::NotFound(_))));
        service.delete(item.id, None).await.unwrap();
        service.restore(item.id).await.unwrap();
        assert_eq!(service.get(item.id).await.unwrap(), item);
    }

    #[tokio::test]
    async fn test_auto_delete_rechecks_expiry() {
        let (service, clock) = setup();
        let item = service.create(insert("Fish", 1)).await.unwrap();

        assert_eq!(service.auto_delete(item.id).await.unwrap(), None);
        clock.advance(ChronoDuration::days(2));
        let trashed = service.auto_delete(item.id).await.unwrap();
        assert_eq!(trashed.map(|i| i.id), Some(item.id));
        assert_eq!(service.auto_delete(item.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_generation_tracks_mutations() {
        let (service, _) = setup();
        assert_eq!(service.generation(), 0);
        let item = service.create(insert("Kale", 2)).await.unwrap();
        service.delete(item.id, None).await.unwrap();
        assert_eq!(service.generation(), 2);
        assert_eq!(service.clear_trash().await.unwrap(), 1);
        assert_eq!(service.clear_trash().await.unwrap(), 0);
        assert_eq!(service.generation(), 3);
    }

    #[tokio::test]
    async fn test_stats() {
        let (service, clock) = setup();
        service.create(insert("Soon", 2)).await.unwrap();
        service.create(insert("Later", 10)).await.unwrap();
        service.create(insert("Far", 40)).await.unwrap();
        let old = service.create(insert("Old", 0)).await.unwrap();
        clock.advance(ChronoDuration::days(1));
        let binned = service.create(insert("Binned", 5)).await.unwrap();
        service.delete(binned.id, None).await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_active, 4);
        assert_eq!(stats.in_trash, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.expiring_soon, 1);
        assert_eq!(stats.by_status.get("danger"), Some(&2));
        assert_eq!(stats.by_status.get("warning"), Some(&1));
        assert_eq!(stats.by_status.get("safe"), Some(&1));
        assert_eq!(stats.by_category.get("None"), Some(&4));
        assert!(old.expiry_date < clock.now());
    }

    /// Memory repository whose writes take a while and record how many
    /// were in flight at once.
    #[derive(Default)]
    struct SlowWriteRepository {
        inner: MemoryFoodItemRepository,
        in_flight: AtomicU64,
        max_in_flight: AtomicU64,
    }

    impl SlowWriteRepository {
        async fn write<T>(&self, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            let result = call.await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    #[async_trait::async_trait]
    impl FoodItemRepository for SlowWriteRepository {
        async fn list(&self, include_deleted: bool) -> AppResult<Vec<FoodItem>> {
            self.inner.list(include_deleted).await
        }
        async fn get(&self, id: Uuid) -> AppResult<Option<FoodItem>> {
            self.inner.get(id).await
        }
        async fn create(&self, item: NewFoodItem, now: DateTime<Utc>) -> AppResult<FoodItem> {
            self.inner.create(item, now).await
        }
        async fn update(&self, id: Uuid, patch: FoodItemPatch) -> AppResult<Option<FoodItem>> {
            self.write(self.inner.update(id, patch)).await
        }
        async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
            self.write(self.inner.soft_delete(id, now)).await
        }
        async fn restore(&self, id: Uuid) -> AppResult<bool> {
            self.write(self.inner.restore(id)).await
        }
        async fn purge(&self, id: Uuid) -> AppResult<bool> {
            self.write(self.inner.purge(id)).await
        }
        async fn clear_trash(&self) -> AppResult<u64> {
            self.inner.clear_trash().await
        }
    }

    fn slow_service() -> (FoodItemsService, Arc<SlowWriteRepository>) {
        let repo = Arc::new(SlowWriteRepository::default());
        let service = FoodItemsService::new(
            repo.clone(),
            PolicyEngine::new(None),
            Arc::new(FixedClock::new(start())),
            Duration::from_secs(5),
        );
        (service, repo)
    }

    #[tokio::test]
    async fn test_same_item_mutations_run_one_at_a_time() {
        let (service, repo) = slow_service();
        let item = service.create(insert("Soup", 2)).await.unwrap();

        let edit = UpdateFoodItemRequest {
            notes: Some(Some("lentil".to_string())),
            ..UpdateFoodItemRequest::default()
        };
        let (deleted, updated) =
            tokio::join!(service.delete(item.id, None), service.update(item.id, edit));
        deleted.unwrap();
        updated.unwrap();
        assert_eq!(repo.max_in_flight.load(Ordering::SeqCst), 1);

        let stored = service.get(item.id).await.unwrap();
        assert!(stored.is_deleted);
        assert!(stored.is_consistent());
        assert_eq!(stored.notes.as_deref(), Some("lentil"));

        let (restored, again) = tokio::join!(service.restore(item.id), service.restore(item.id));
        assert_eq!(
            [restored.is_ok(), again.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        assert!(service.get(item.id).await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_different_items_are_not_serialized() {
        let (service, repo) = slow_service();
        let a = service.create(insert("Soup", 2)).await.unwrap();
        let b = service.create(insert("Bread", 2)).await.unwrap();

        let (first, second) = tokio::join!(service.delete(a.id, None), service.delete(b.id, None));
        first.unwrap();
        second.unwrap();
        assert_eq!(repo.max_in_flight.load(Ordering::SeqCst), 2);
    }

    struct StalledRepository;

    #[async_trait::async_trait]
    impl FoodItemRepository for StalledRepository {
        async fn list(&self, _include_deleted: bool) -> AppResult<Vec<FoodItem>> {
            std::future::pending().await
        }
        async fn get(&self, _id: Uuid) -> AppResult<Option<FoodItem>> {
            std::future::pending().await
        }
        async fn create(&self, _item: NewFoodItem, _now: DateTime<Utc>) -> AppResult<FoodItem> {
            std::future::pending().await
        }
        async fn update(&self, _id: Uuid, _patch: FoodItemPatch) -> AppResult<Option<FoodItem>> {
            std::future::pending().await
        }
        async fn soft_delete(&self, _id: Uuid, _now: DateTime<Utc>) -> AppResult<bool> {
            std::future::pending().await
        }
        async fn restore(&self, _id: Uuid) -> AppResult<bool> {
            std::future::pending().await
        }
        async fn purge(&self, _id: Uuid) -> AppResult<bool> {
            std::future::pending().await
        }
        async fn clear_trash(&self) -> AppResult<u64> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_stalled_repository_fails_closed() {
        let service = FoodItemsService::new(
            Arc::new(StalledRepository),
            PolicyEngine::new(None),
            Arc::new(FixedClock::new(start())),
            Duration::from_millis(20),
        );
        assert!(matches!(service.clear_trash().await, Err(AppError::Timeout)));
        assert!(matches!(service.delete(Uuid::new_v4(), None).await, Err(AppError::Timeout)));
        assert_eq!(service.generation(), 0);
    }
}
