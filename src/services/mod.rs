pub mod food_items_service;
pub mod health_service;
pub mod lifecycle;

pub use food_items_service::{FoodItemsService, FoodStats};
pub use lifecycle::{CycleReport, LifecycleWorker};
