use axum::{Router, routing::get};
use crate::{AppState, controllers::settings_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route(
        "/settings",
        get(settings_controller::get_settings).put(settings_controller::put_settings),
    )
}
