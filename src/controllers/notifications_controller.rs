use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{services::dispatcher::NotificationContent, AppState};

fn storage_failed(state: &AppState, e: impl std::fmt::Display) -> Response {
    tracing::error!("notification store write failed: {}", e);
    let _ = state.events_tx.send("storageFailed".to_string());
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("storage error: {e}") })),
    )
        .into_response()
}

// GET /notifications
pub async fn get_notifications(State(state): State<AppState>) -> Response {
    let notifications = state.notifications.list().await;
    let count = notifications.len();

    (
        StatusCode::OK,
        Json(json!({ "notifications": notifications, "count": count })),
    )
        .into_response()
}

// GET /notifications/:id
pub async fn get_notification(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.notifications.get(&id).await {
        Some(n) => (StatusCode::OK, Json(json!({ "notification": n }))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "notification not found" })),
        )
            .into_response(),
    }
}

// DELETE /notifications/:id
pub async fn delete_notification(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.notifications.remove_by_id(&id).await {
        Ok(true) => {
            let _ = state.events_tx.send("notificationsUpdated".to_string());
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "notification not found" })),
        )
            .into_response(),
        Err(e) => storage_failed(&state, e),
    }
}

// DELETE /notifications
pub async fn delete_all_notifications(State(state): State<AppState>) -> Response {
    match state.notifications.clear_all().await {
        Ok(()) => {
            let _ = state.events_tx.send("notificationsUpdated".to_string());
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => storage_failed(&state, e),
    }
}

#[derive(Deserialize)]
pub struct PushForm {
    // absent or non-string titles fall back to "No Title" when recorded
    #[serde(default, deserialize_with = "string_or_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

fn string_or_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

// POST /notifications/push
pub async fn post_push_notification(
    State(state): State<AppState>,
    Json(form): Json<PushForm>,
) -> Response {
    let identifier = state.delivery.push(NotificationContent {
        title: form.title,
        body: form.body,
        data: form.data,
    });

    (StatusCode::ACCEPTED, Json(json!({ "identifier": identifier }))).into_response()
}
