use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{models::WatchEntry, AppState};

#[derive(Deserialize)]
pub struct WatchForm {
    #[serde(default)]
    pub commodity: String,
    #[serde(rename = "priceWithProfit", default)]
    pub price_with_profit: Value,
}

// GET /watches
pub async fn get_watches(State(state): State<AppState>) -> Response {
    let watches = state.watches.list().await;
    (StatusCode::OK, Json(json!({ "watches": watches }))).into_response()
}

// POST /watches
pub async fn post_add_watch(
    State(state): State<AppState>,
    Json(form): Json<WatchForm>,
) -> Response {
    let commodity = form.commodity.trim().to_string();
    if commodity.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": { "commodity": "Select a commodity." } })),
        )
            .into_response();
    }

    let price_with_profit = match form.price_with_profit {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    };

    let entry = WatchEntry {
        commodity,
        price_with_profit,
    };
    state.watches.add(entry.clone()).await;

    (StatusCode::CREATED, Json(json!({ "watch": entry }))).into_response()
}

// DELETE /watches/:commodity
pub async fn delete_watch(State(state): State<AppState>, Path(commodity): Path<String>) -> Response {
    let removed = state.watches.remove_commodity(&commodity).await;
    if removed == 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no watch for that commodity" })),
        )
            .into_response();
    }

    (StatusCode::OK, Json(json!({ "removed": removed }))).into_response()
}

// DELETE /watches
pub async fn delete_all_watches(State(state): State<AppState>) -> Response {
    state.watches.clear().await;
    StatusCode::NO_CONTENT.into_response()
}
