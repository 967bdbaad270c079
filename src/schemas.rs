use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::admin::{AdminIndexResponse, AdminRow, AdminSite, AppEntry, ColumnInfo, ListResponse, ModelEntry};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Admin site with the registered models
    pub admin: Arc<AdminSite>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
    /// Number of models registered on the admin site
    pub admin_models: usize,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::followings::get_followings,
        crate::handlers::followings::get_followers,
        crate::handlers::followings::follow_user,
        crate::handlers::followings::set_followings,
        crate::handlers::followings::unfollow_user,
        crate::handlers::admin::admin_index,
        crate::handlers::admin::list_objects,
        crate::handlers::admin::create_object,
        crate::handlers::admin::get_object,
        crate::handlers::admin::update_object,
        crate::handlers::admin::delete_object,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::followings::FollowRequest,
            crate::handlers::followings::SetFollowingsRequest,
            crate::handlers::admin::AdminListQuery,
            AdminIndexResponse,
            AppEntry,
            ModelEntry,
            ListResponse,
            ColumnInfo,
            AdminRow,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "followings", description = "Follow relations between users"),
        (name = "admin", description = "Administrative CRUD over registered models"),
    ),
    info(
        title = "MovieClub API",
        description = "MovieClub API - users following each other and an admin site over the movie catalog",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
