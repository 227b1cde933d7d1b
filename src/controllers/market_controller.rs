use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::FeedError,
    models::calculation::COMMODITIES,
    services::{
        alert_monitor::{CycleOutcome, Trigger},
        messages,
    },
    AppState,
};

async fn feed_error_json(state: &AppState, err: Option<&FeedError>) -> Value {
    let Some(err) = err else {
        return Value::Null;
    };

    let lang = state.preferences.get().await.language;
    let key = match err {
        FeedError::Timeout => "feed_timeout",
        FeedError::Unavailable(_) => "feed_unavailable",
    };

    json!({
        "message": messages::render(&state.messages, lang, key, &json!({})),
        "detail": err.to_string(),
    })
}

async fn market_view(state: &AppState) -> Value {
    let snapshot = state.monitor.latest().await;
    let last_error = state.monitor.last_error().await;
    let error = feed_error_json(state, last_error.as_ref()).await;

    let (rows, fetched_at, commodities) = match snapshot {
        Some(s) => {
            let commodities = s.commodities();
            (json!(s.rows), json!(s.fetched_at), json!(commodities))
        }
        None => (json!([]), Value::Null, json!([])),
    };

    json!({
        "state": state.monitor.state(),
        "rows": rows,
        "fetchedAt": fetched_at,
        "commodities": commodities,
        "error": error,
    })
}

// GET /market
pub async fn get_market(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(market_view(&state).await)).into_response()
}

// POST /market/refresh
pub async fn post_refresh_market(State(state): State<AppState>) -> Response {
    let outcome = state.monitor.run_cycle(Trigger::Manual).await;

    let (status, label) = match &outcome {
        CycleOutcome::Evaluated { .. } => (StatusCode::OK, "evaluated"),
        CycleOutcome::Skipped => (StatusCode::OK, "skipped"),
        CycleOutcome::Failed(FeedError::Timeout) => (StatusCode::GATEWAY_TIMEOUT, "failed"),
        CycleOutcome::Failed(FeedError::Unavailable(_)) => (StatusCode::SERVICE_UNAVAILABLE, "failed"),
    };

    let mut body = market_view(&state).await;
    body["outcome"] = json!(label);
    if let CycleOutcome::Evaluated { rows, matches, recorded } = outcome {
        body["cycle"] = json!({ "rows": rows, "matches": matches, "recorded": recorded });
    }

    (status, Json(body)).into_response()
}

#[derive(Deserialize)]
pub struct AppStateForm {
    pub state: String,
}

// POST /app/state
pub async fn post_app_state(
    State(state): State<AppState>,
    Json(form): Json<AppStateForm>,
) -> Response {
    let active = match form.state.trim().to_ascii_lowercase().as_str() {
        "active" => true,
        "background" | "inactive" => false,
        _ => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": { "state": "Use active, inactive or background." } })),
            )
                .into_response();
        }
    };

    let queued = state.monitor.set_foreground(active);

    (
        StatusCode::OK,
        Json(json!({ "foreground": active, "refreshQueued": queued })),
    )
        .into_response()
}

// GET /commodities
pub async fn get_commodities(State(state): State<AppState>) -> Response {
    let market = state
        .monitor
        .latest()
        .await
        .map(|s| s.commodities())
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(json!({ "known": COMMODITIES, "market": market })),
    )
        .into_response()
}
