use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{item_id, json_body, AppState};
use crate::error::AppResult;
use crate::models::{InsertFoodItemRequest, UpdateFoodItemRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFoodItemRequest {
    #[serde(default)]
    pub admin_password: Option<String>,
}

fn message(text: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": text }))
}

pub async fn list_food_items(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.food_items.list_active().await?))
}

pub async fn list_trash(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.food_items.list_trash().await?))
}

pub async fn get_food_item(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let id = item_id(path)?;
    Ok(Json(state.food_items.get(id).await?))
}

pub async fn create_food_item(
    State(state): State<AppState>,
    body: Result<Json<InsertFoodItemRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let req = json_body(body)?;
    let item = state.food_items.create(req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_food_item(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateFoodItemRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = item_id(path)?;
    let req = json_body(body)?;
    Ok(Json(state.food_items.update(id, req).await?))
}

/// The body is optional; a bare DELETE carries no password.
pub async fn delete_food_item(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Option<Json<DeleteFoodItemRequest>>,
) -> AppResult<impl IntoResponse> {
    let id = item_id(path)?;
    let req = body.map(|Json(req)| req).unwrap_or_default();
    state
        .food_items
        .delete(id, req.admin_password.as_deref())
        .await?;
    Ok(message("Food item moved to trash"))
}

pub async fn restore_food_item(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let id = item_id(path)?;
    state.food_items.restore(id).await?;
    Ok(message("Food item restored"))
}

pub async fn purge_food_item(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let id = item_id(path)?;
    state.food_items.purge(id).await?;
    Ok(message("Food item permanently deleted"))
}

pub async fn clear_trash(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cleared = state.food_items.clear_trash().await?;
    Ok(Json(serde_json::json!({
        "message": "Trash cleared",
        "cleared": cleared,
    })))
}
