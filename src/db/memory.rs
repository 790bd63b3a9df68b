use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::FoodItemRepository;
use crate::error::AppResult;
use crate::models::{FoodItem, FoodItemPatch, NewFoodItem};

/// Process-local store used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryFoodItemRepository {
    items: RwLock<HashMap<Uuid, FoodItem>>,
}

impl MemoryFoodItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed record as-is.
    pub async fn insert(&self, item: FoodItem) {
        self.items.write().await.insert(item.id, item);
    }
}

fn sort_items(items: &mut [FoodItem]) {
    items.sort_by(|a, b| {
        a.expiry_date
            .cmp(&b.expiry_date)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[async_trait]
impl FoodItemRepository for MemoryFoodItemRepository {
    async fn list(&self, include_deleted: bool) -> AppResult<Vec<FoodItem>> {
        let mut items: Vec<FoodItem> = self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.is_deleted == include_deleted)
            .cloned()
            .collect();
        sort_items(&mut items);
        Ok(items)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<FoodItem>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn create(&self, item: NewFoodItem, now: DateTime<Utc>) -> AppResult<FoodItem> {
        let created = FoodItem {
            id: Uuid::new_v4(),
            name: item.name,
            expiry_date: item.expiry_date,
            category: item.category,
            notes: item.notes,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
        };
        self.items.write().await.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: FoodItemPatch) -> AppResult<Option<FoodItem>> {
        let mut items = self.items.write().await;
        Ok(items.get_mut(&id).map(|item| {
            patch.apply_to(item);
            item.clone()
        }))
    }

    async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut items = self.items.write().await;
        match items.get_mut(&id) {
            Some(item) => {
                if !item.is_deleted {
                    item.is_deleted = true;
                    item.deleted_at = Some(now);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn restore(&self, id: Uuid) -> AppResult<bool> {
        let mut items = self.items.write().await;
        match items.get_mut(&id) {
            Some(item) if item.is_deleted => {
                item.is_deleted = false;
                item.deleted_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.items.write().await.remove(&id).is_some())
    }

    async fn clear_trash(&self) -> AppResult<u64> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|_, item| !item.is_deleted);
        Ok((before - items.len()) as u64)
    }
}
