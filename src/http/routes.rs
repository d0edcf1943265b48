use axum::{
    Router,
    routing::{delete, get},
};

use crate::{http::handlers::*, state::AppState};

pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/ratings",
            get(get_all_ratings_handler).post(submit_rating_handler),
        )
        .route("/ratings/{id}", delete(delete_rating_handler))
        .route("/ratings/store/{id}", get(get_store_ratings_handler))
        .route(
            "/ratings/store/{id}/stats",
            get(get_store_rating_stats_handler),
        )
        .route("/ratings/store/{id}/mine", get(get_my_rating_handler))
        .route("/stores", get(get_stores_handler))
        .route("/stores/mine", get(get_my_stores_handler))
        .route("/stores/{id}", get(get_store_handler))
        .route("/users", get(get_users_handler))
        .route("/users/{id}", get(get_user_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/dashboard/admin", get(admin_dashboard_handler))
        .route("/dashboard/store-owner", get(store_owner_dashboard_handler))
        .route("/dashboard/user", get(user_dashboard_handler))
        .with_state(state)
}
