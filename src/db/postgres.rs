use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::repository::FoodItemRepository;
use crate::error::AppResult;
use crate::models::{FoodItem, FoodItemPatch, FoodItemRow, NewFoodItem};

const COLUMNS: &str =
    "id, name, expiry_date, category, notes, is_deleted, deleted_at, created_at";

pub struct PgFoodItemRepository {
    pool: PgPool,
}

impl PgFoodItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FoodItemRepository for PgFoodItemRepository {
    async fn list(&self, include_deleted: bool) -> AppResult<Vec<FoodItem>> {
        let sql = format!(
            "SELECT {} FROM food_items WHERE is_deleted = $1 ORDER BY expiry_date ASC, name ASC",
            COLUMNS
        );
        let rows: Vec<FoodItemRow> = sqlx::query_as(&sql)
            .bind(include_deleted)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(FoodItem::from).collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<FoodItem>> {
        let sql = format!("SELECT {} FROM food_items WHERE id = $1", COLUMNS);
        let row: Option<FoodItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(FoodItem::from))
    }

    async fn create(&self, item: NewFoodItem, now: DateTime<Utc>) -> AppResult<FoodItem> {
        let sql = format!(
            "INSERT INTO food_items (id, name, expiry_date, category, notes, is_deleted, deleted_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, FALSE, NULL, $6) \
             RETURNING {}",
            COLUMNS
        );
        let row: FoodItemRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&item.name)
            .bind(item.expiry_date)
            .bind(item.category.as_str())
            .bind(item.notes.as_deref())
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, patch: FoodItemPatch) -> AppResult<Option<FoodItem>> {
        // notes: $5 says whether to touch the column, $6 is the new value (NULL clears)
        let sql = format!(
            "UPDATE food_items SET \
             name = COALESCE($2, name), \
             expiry_date = COALESCE($3, expiry_date), \
             category = COALESCE($4, category), \
             notes = CASE WHEN $5 THEN $6 ELSE notes END \
             WHERE id = $1 \
             RETURNING {}",
            COLUMNS
        );
        let row: Option<FoodItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.expiry_date)
            .bind(patch.category.map(|c| c.as_str()))
            .bind(patch.notes.is_some())
            .bind(patch.notes.clone().flatten())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(FoodItem::from))
    }

    async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            "UPDATE food_items SET is_deleted = TRUE, deleted_at = COALESCE(deleted_at, $2) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn restore(&self, id: Uuid) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            "UPDATE food_items SET is_deleted = FALSE, deleted_at = NULL \
             WHERE id = $1 AND is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn purge(&self, id: Uuid) -> AppResult<bool> {
        let rows_affected = sqlx::query("DELETE FROM food_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn clear_trash(&self) -> AppResult<u64> {
        let rows_affected = sqlx::query("DELETE FROM food_items WHERE is_deleted")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!("Cleared {} item(s) from trash", rows_affected);
        Ok(rows_affected)
    }
}
