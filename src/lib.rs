pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod expiry;
pub mod http_client;
pub mod models;
pub mod notifications;
pub mod policy;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
