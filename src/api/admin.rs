use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{json_body, AppState};
use crate::error::AppResult;
use crate::models::Settings;

#[derive(Debug, Deserialize)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPasswordResponse {
    pub valid: bool,
}

pub async fn verify_password(
    State(state): State<AppState>,
    body: Result<Json<VerifyPasswordRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let req = json_body(body)?;
    let valid = state.food_items.verify_password(&req.password)?;
    Ok(Json(VerifyPasswordResponse { valid }))
}

pub async fn stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.food_items.stats().await?))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.lifecycle.settings().await)
}

pub async fn update_settings(
    State(state): State<AppState>,
    body: Result<Json<Settings>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let settings = json_body(body)?;
    Ok(Json(state.lifecycle.update_settings(settings).await))
}
