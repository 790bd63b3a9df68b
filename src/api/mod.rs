pub mod admin;
pub mod food_items;
pub mod lifecycle;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::Config;
use crate::db::FoodItemRepository;
use crate::error::{AppError, AppResult};
use crate::http_client::HttpClient;
use crate::notifications::{NotificationDispatcher, NotificationSink, ToastFeed, WebhookPushSink};
use crate::policy::PolicyEngine;
use crate::services::{health_service, FoodItemsService, LifecycleWorker};

#[derive(Clone)]
pub struct AppState {
    pub food_items: Arc<FoodItemsService>,
    pub lifecycle: Arc<LifecycleWorker>,
}

impl AppState {
    pub fn new(food_items: Arc<FoodItemsService>, lifecycle: Arc<LifecycleWorker>) -> Self {
        Self {
            food_items,
            lifecycle,
        }
    }

    /// Wires the service, dispatcher and lifecycle worker around a repository.
    pub fn build(
        config: &Config,
        repo: Arc<dyn FoodItemRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let food_items = Arc::new(FoodItemsService::new(
            repo,
            PolicyEngine::new(config.admin_secret.clone()),
            clock,
            config.repository_timeout,
        ));

        let push = config.push_webhook_url.as_ref().map(|url| {
            tracing::info!("Push notifications forwarded to {}", url);
            let sink = WebhookPushSink::new(url.clone(), HttpClient::new());
            Arc::new(sink) as Arc<dyn NotificationSink>
        });
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::new(ToastFeed::default()),
            push,
            config.push_permission,
        ));

        let lifecycle = Arc::new(LifecycleWorker::new(
            food_items.clone(),
            dispatcher,
            config.settings,
        ));
        Self::new(food_items, lifecycle)
    }
}

/// Build the Axum router with all API routes and middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Food items
        .route(
            "/food-items",
            get(food_items::list_food_items).post(food_items::create_food_item),
        )
        .route("/food-items/trash", get(food_items::list_trash))
        .route("/food-items/trash/clear", delete(food_items::clear_trash))
        .route(
            "/food-items/:id",
            get(food_items::get_food_item)
                .patch(food_items::update_food_item)
                .delete(food_items::delete_food_item),
        )
        .route("/food-items/:id/restore", post(food_items::restore_food_item))
        .route("/food-items/:id/permanent", delete(food_items::purge_food_item))
        // Admin
        .route("/verify-password", post(admin::verify_password))
        .route("/stats", get(admin::stats))
        .route("/settings", get(admin::get_settings).put(admin::update_settings))
        // Lifecycle
        .route("/notifications", get(lifecycle::notifications))
        .route("/lifecycle/run", post(lifecycle::run_cycle));

    Router::new()
        .route("/health", get(health_service::check))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Unwraps a JSON body, turning a malformed one into a 400 with a JSON error.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::Validation(rejection.body_text())
    })
}

pub(crate) fn item_id(path: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::Validation("Invalid food item id".to_string()))
}
