use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    services::alerts_service::{AlertDraft, AlertError},
    AppState,
};

#[derive(Deserialize)]
pub struct AlertForm {
    #[serde(default)]
    pub commodity: String,
    #[serde(rename = "priceType", default)]
    pub price_type: String,
    // number or numeric string
    #[serde(rename = "targetValue", default)]
    pub target_value: Value,
}

impl AlertForm {
    fn draft(&self) -> AlertDraft {
        let target_value = match &self.target_value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => String::new(),
        };

        AlertDraft {
            commodity: self.commodity.clone(),
            price_type: self.price_type.clone(),
            target_value,
        }
    }
}

fn alert_error(e: AlertError) -> Response {
    match e {
        AlertError::Invalid(errors) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors }))).into_response()
        }
        AlertError::Storage(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("storage error: {e}") })),
        )
            .into_response(),
    }
}

// GET /alerts
pub async fn get_alerts(State(state): State<AppState>) -> Response {
    let alerts = state.alerts.list().await;
    let count = alerts.len();

    (StatusCode::OK, Json(json!({ "alerts": alerts, "count": count }))).into_response()
}

// POST /alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    Json(form): Json<AlertForm>,
) -> Response {
    match state.alerts.create_alert(&form.draft()).await {
        Ok(alert) => {
            let _ = state.events_tx.send("alertsUpdated".to_string());
            (StatusCode::CREATED, Json(json!({ "alert": alert }))).into_response()
        }
        Err(e) => alert_error(e),
    }
}

// PUT /alerts/:id
pub async fn put_update_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<AlertForm>,
) -> Response {
    match state.alerts.update_alert(&id, &form.draft()).await {
        Ok(Some(alert)) => {
            let _ = state.events_tx.send("alertsUpdated".to_string());
            (StatusCode::OK, Json(json!({ "alert": alert }))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "alert not found" })),
        )
            .into_response(),
        Err(e) => alert_error(e),
    }
}

// DELETE /alerts/:id
pub async fn delete_alert(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.alerts.delete_alert(&id).await {
        Ok(true) => {
            let _ = state.events_tx.send("alertsUpdated".to_string());
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "alert not found" })),
        )
            .into_response(),
        Err(e) => alert_error(AlertError::Storage(e)),
    }
}
