pub mod food_item;
pub mod settings;

pub use food_item::*;
pub use settings::Settings;
