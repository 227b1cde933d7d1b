use axum::{Router, routing::get};
use crate::{AppState, controllers::calculations_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/calculations",
            get(calculations_controller::get_calculations).post(calculations_controller::post_calculate),
        )
        .route("/calculations/summary", get(calculations_controller::get_summary))
}
