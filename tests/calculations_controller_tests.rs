mod common;

use axum::{http::StatusCode, routing::get, Router};
use agrimarket::{
    controllers::calculations_controller,
    models::{calculation::INVALID_INPUT, FormFields},
    routes,
    services::calculation_service::{calculate, summarize},
    AppState,
};
use serde_json::json;
use tower::ServiceExt;

use common::{json_request, response_json, test_state, MAIZE};

fn calculations_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/calculations",
            get(calculations_controller::get_calculations).post(calculations_controller::post_calculate),
        )
        .route("/calculations/summary", get(calculations_controller::get_summary))
        .with_state(state)
}

fn form(hectares: &str, yield_t: &str) -> FormFields {
    FormFields {
        hectares: hectares.to_string(),
        seed_cost: "1000".to_string(),
        fertiliser_cost: "500".to_string(),
        profit_wanted: "500".to_string(),
        average_yield: yield_t.to_string(),
        insurance: "200".to_string(),
        ..FormFields::default()
    }
}

#[test]
fn calculate_divides_costs_by_area_and_yield() {
    let result = calculate(&form("10", "5"));

    assert_eq!(result.break_even, "30.00");
    assert_eq!(result.price_with_profit, "40.00");
}

#[test]
fn insurance_counts_only_when_selected() {
    let mut fields = form("10", "5");
    fields.has_insurance = true;

    let result = calculate(&fields);

    assert_eq!(result.break_even, "34.00");
    assert_eq!(result.price_with_profit, "44.00");
}

#[test]
fn zero_area_or_yield_is_invalid_input() {
    for fields in [form("0", "5"), form("10", ""), form("abc", "5")] {
        let result = calculate(&fields);
        assert_eq!(result.break_even, INVALID_INPUT);
        assert_eq!(result.price_with_profit, INVALID_INPUT);
    }
}

#[tokio::test]
async fn summary_skips_invalid_results() {
    assert!(summarize(&[]).is_none());

    let (state, _) = test_state("");
    state.calculations.record(form("10", "5")).await.unwrap();
    state.calculations.record(form("20", "5")).await.unwrap();
    state.calculations.record(form("0", "5")).await.unwrap();

    let summary = summarize(&state.calculations.history().await).unwrap();

    assert_eq!(summary.count, 2);
    assert_eq!(summary.avg_break_even, 22.5);
    assert_eq!(summary.avg_profit, 30.0);
}

#[tokio::test]
async fn post_calculate_records_and_lists_history() {
    let (state, _) = test_state("");
    let app = calculations_app(state);

    let req = json_request(
        "POST",
        "/calculations",
        Some(json!({
            "hectares": "10",
            "seedCost": "1000",
            "fertiliserCost": "500",
            "averageYield": "5",
            "profitWanted": "500",
            "commodity": MAIZE
        })),
    );
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = response_json(res).await;
    assert_eq!(body["calculation"]["result"]["breakEven"], json!("30.00"));
    assert_eq!(body["calculation"]["result"]["priceWithProfit"], json!("40.00"));

    let res = app.clone().oneshot(json_request("GET", "/calculations", None)).await.unwrap();
    let body = response_json(res).await;
    assert_eq!(body["calculations"].as_array().unwrap().len(), 1);
    assert!(body["lastCalculatedAt"].is_string());

    let res = app.oneshot(json_request("GET", "/calculations/summary", None)).await.unwrap();
    let body = response_json(res).await;
    assert_eq!(body["summary"]["avgBreakEven"], json!(30.0));
    assert_eq!(body["summary"]["count"], json!(1));
}

#[tokio::test]
async fn empty_history_has_no_summary() {
    let (state, _) = test_state("");
    let app = calculations_app(state);

    let res = app.clone().oneshot(json_request("GET", "/calculations", None)).await.unwrap();
    let body = response_json(res).await;
    assert_eq!(body["calculations"], json!([]));
    assert!(body["lastCalculatedAt"].is_null());

    let res = app.oneshot(json_request("GET", "/calculations/summary", None)).await.unwrap();
    assert!(response_json(res).await["summary"].is_null());
}

#[tokio::test]
async fn settings_round_trip() {
    let (state, _) = test_state("");
    let app = routes::app(state.clone());

    let res = app.clone().oneshot(json_request("GET", "/settings", None)).await.unwrap();
    let body = response_json(res).await;
    assert_eq!(body["settings"], json!({ "language": "en", "notificationsEnabled": true }));

    let res = app
        .oneshot(json_request(
            "PUT",
            "/settings",
            Some(json!({ "notificationsEnabled": false })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        response_json(res).await["settings"],
        json!({ "language": "en", "notificationsEnabled": false })
    );
    assert!(!state.preferences.get().await.notifications_enabled);
}

#[tokio::test]
async fn watches_add_remove_and_clear() {
    let (state, _) = test_state("");
    let app = routes::app(state.clone());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/watches",
            Some(json!({ "commodity": "WHEAT", "priceWithProfit": 5000 })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(response_json(res).await["watch"]["priceWithProfit"], json!("5000"));

    let res = app
        .clone()
        .oneshot(json_request("POST", "/watches", Some(json!({ "commodity": " " }))))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app.clone().oneshot(json_request("DELETE", "/watches/WHEAT", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_json(res).await["removed"], json!(1));

    let res = app.clone().oneshot(json_request("DELETE", "/watches/WHEAT", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    state
        .watches
        .add(agrimarket::models::WatchEntry {
            commodity: MAIZE.to_string(),
            price_with_profit: "1".to_string(),
        })
        .await;
    let res = app.oneshot(json_request("DELETE", "/watches", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(state.watches.list().await.is_empty());
}
