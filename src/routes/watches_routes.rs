use axum::{Router, routing::{delete, get}};
use crate::{AppState, controllers::watches_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/watches",
            get(watches_controller::get_watches)
                .post(watches_controller::post_add_watch)
                .delete(watches_controller::delete_all_watches),
        )
        .route("/watches/:commodity", delete(watches_controller::delete_watch))
}
