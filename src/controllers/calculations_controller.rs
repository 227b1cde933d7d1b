use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{models::FormFields, AppState};

// GET /calculations
pub async fn get_calculations(State(state): State<AppState>) -> Response {
    let calculations = state.calculations.history().await;

    let last = match state.calculations.last_calculated_at() {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("could not read last calculation time: {}", e);
            None
        }
    };

    (
        StatusCode::OK,
        Json(json!({ "calculations": calculations, "lastCalculatedAt": last })),
    )
        .into_response()
}

// POST /calculations
pub async fn post_calculate(
    State(state): State<AppState>,
    Json(fields): Json<FormFields>,
) -> Response {
    match state.calculations.record(fields).await {
        Ok(record) => {
            let _ = state.events_tx.send("calculationsUpdated".to_string());
            (StatusCode::CREATED, Json(json!({ "calculation": record }))).into_response()
        }
        Err(e) => {
            tracing::error!("could not store calculation: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("storage error: {e}") })),
            )
                .into_response()
        }
    }
}

// GET /calculations/summary
pub async fn get_summary(State(state): State<AppState>) -> Response {
    let summary = state.calculations.summary().await;
    (StatusCode::OK, Json(json!({ "summary": summary }))).into_response()
}
