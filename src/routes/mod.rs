use axum::Router;
use tower_http::trace::TraceLayer;

use crate::{AppState, controllers::home_controller};

pub mod home_routes;
pub mod market_routes;
pub mod alerts_routes;
pub mod watches_routes;
pub mod notifications_routes;
pub mod calculations_routes;
pub mod settings_routes;
pub mod realtime_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = market_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);
    let router = watches_routes::add_routes(router);
    let router = notifications_routes::add_routes(router);
    let router = calculations_routes::add_routes(router);
    let router = settings_routes::add_routes(router);
    let router = realtime_routes::add_routes(router);

    router
        .fallback(home_controller::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
