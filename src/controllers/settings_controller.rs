use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{services::preferences::PreferencesPatch, AppState};

// GET /settings
pub async fn get_settings(State(state): State<AppState>) -> Response {
    let prefs = state.preferences.get().await;
    (StatusCode::OK, Json(json!({ "settings": prefs }))).into_response()
}

// PUT /settings
pub async fn put_settings(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> Response {
    match state.preferences.update(patch).await {
        Ok(prefs) => {
            let _ = state.events_tx.send("settingsUpdated".to_string());
            (StatusCode::OK, Json(json!({ "settings": prefs }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("storage error: {e}") })),
        )
            .into_response(),
    }
}
