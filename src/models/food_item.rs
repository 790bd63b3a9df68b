use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "None")]
    Uncategorized,
    #[serde(rename = "LSSD")]
    Lssd,
    #[serde(rename = "GM")]
    Gm,
    #[serde(rename = "RTE")]
    Rte,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Uncategorized,
        Category::Lssd,
        Category::Gm,
        Category::Rte,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Uncategorized => "None",
            Category::Lssd => "LSSD",
            Category::Gm => "GM",
            Category::Rte => "RTE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub expiry_date: DateTime<Utc>,
    pub category: Category,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FoodItem {
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Identity used to reject a second active item with the same name on the same day.
    pub fn duplicate_key(&self) -> (String, NaiveDate) {
        duplicate_key(&self.name, self.expiry_date)
    }

    /// `deleted_at` must be set exactly when the item is trashed.
    pub fn is_consistent(&self) -> bool {
        self.is_deleted == self.deleted_at.is_some()
            && self.deleted_at.map_or(true, |d| d >= self.created_at)
    }
}

pub fn duplicate_key(name: &str, expiry_date: DateTime<Utc>) -> (String, NaiveDate) {
    (name.trim().to_lowercase(), expiry_date.date_naive())
}

/// Row shape of the `food_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct FoodItemRow {
    pub id: Uuid,
    pub name: String,
    pub expiry_date: DateTime<Utc>,
    pub category: String,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<FoodItemRow> for FoodItem {
    fn from(row: FoodItemRow) -> Self {
        let category = row.category.parse().unwrap_or_else(|e| {
            tracing::warn!("Food item {} has {}, treating as None", row.id, e);
            Category::Uncategorized
        });

        FoodItem {
            id: row.id,
            name: row.name,
            expiry_date: row.expiry_date,
            category,
            notes: row.notes,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
        }
    }
}

/// Validated fields for a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodItem {
    pub name: String,
    pub expiry_date: DateTime<Utc>,
    pub category: Category,
    pub notes: Option<String>,
}

/// Validated partial update. `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodItemPatch {
    pub name: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub notes: Option<Option<String>>,
}

impl FoodItemPatch {
    pub fn apply_to(&self, item: &mut FoodItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(expiry_date) = self.expiry_date {
            item.expiry_date = expiry_date;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(notes) = &self.notes {
            item.notes = notes.clone();
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertFoodItemRequest {
    pub name: String,
    pub expiry_date: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFoodItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Absent leaves the notes alone; `null` or `""` clears them.
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

/// Tells an explicit `null` apart from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
