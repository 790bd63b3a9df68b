use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{FoodItem, FoodItemPatch, NewFoodItem};

/// Persistence for food items, including the soft-delete lifecycle.
///
/// Implementations store whatever they are given: duplicate detection and the
/// password gate happen above this layer.
#[async_trait]
pub trait FoodItemRepository: Send + Sync {
    /// Active items, or trashed items when `include_deleted` is set.
    async fn list(&self, include_deleted: bool) -> AppResult<Vec<FoodItem>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<FoodItem>>;

    async fn create(&self, item: NewFoodItem, now: DateTime<Utc>) -> AppResult<FoodItem>;

    async fn update(&self, id: Uuid, patch: FoodItemPatch) -> AppResult<Option<FoodItem>>;

    /// Moves an item to the trash. Returns whether the item exists; deleting an
    /// already trashed item keeps its original `deleted_at`.
    async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Returns false unless the item exists and is currently trashed.
    async fn restore(&self, id: Uuid) -> AppResult<bool>;

    async fn purge(&self, id: Uuid) -> AppResult<bool>;

    /// Hard-deletes every trashed item and returns how many were removed.
    async fn clear_trash(&self) -> AppResult<u64>;
}
