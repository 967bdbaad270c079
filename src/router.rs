use crate::handlers::{
    admin::{admin_index, create_object, delete_object, get_object, list_objects, update_object},
    followings::{follow_user, get_followers, get_followings, set_followings, unfollow_user},
    health::health_check,
    users::{create_user, delete_user, get_user, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User CRUD routes
        .route("/api/v1/users", get(get_users).post(create_user))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Follow relations
        .route(
            "/api/v1/users/:user_id/followings",
            get(get_followings).post(follow_user).put(set_followings),
        )
        .route("/api/v1/users/:user_id/followers", get(get_followers))
        .route(
            "/api/v1/users/:user_id/followings/:followee_id",
            delete(unfollow_user),
        )
        // Admin site
        .route("/admin", get(admin_index))
        .route(
            "/admin/:app_label/:model_name",
            get(list_objects).post(create_object),
        )
        .route(
            "/admin/:app_label/:model_name/:object_id",
            get(get_object).put(update_object).delete(delete_object),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
