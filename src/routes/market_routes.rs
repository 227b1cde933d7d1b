use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::market_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/market", get(market_controller::get_market))
        .route("/market/refresh", post(market_controller::post_refresh_market))
        .route("/app/state", post(market_controller::post_app_state))
        .route("/commodities", get(market_controller::get_commodities))
}
