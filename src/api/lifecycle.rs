use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppResult;
use crate::notifications::{PushPermission, Toast};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationsQuery {
    /// Only toasts with a sequence number above this one.
    #[serde(default)]
    pub after: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub permission: PushPermission,
    pub toasts: Vec<Toast>,
}

pub async fn notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> Json<NotificationsResponse> {
    let dispatcher = state.lifecycle.dispatcher();
    Json(NotificationsResponse {
        permission: dispatcher.permission(),
        toasts: dispatcher.toasts().since(query.after),
    })
}

/// Runs one lifecycle cycle now instead of waiting for the next tick.
pub async fn run_cycle(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.lifecycle.run_cycle().await?))
}
