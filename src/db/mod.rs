pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use memory::MemoryFoodItemRepository;
pub use pool::{create_pool, run_migrations};
pub use postgres::PgFoodItemRepository;
pub use repository::FoodItemRepository;
