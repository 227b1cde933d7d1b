use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::notifications_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/notifications",
            get(notifications_controller::get_notifications)
                .delete(notifications_controller::delete_all_notifications),
        )
        .route("/notifications/push", post(notifications_controller::post_push_notification))
        .route(
            "/notifications/:id",
            get(notifications_controller::get_notification)
                .delete(notifications_controller::delete_notification),
        )
}
