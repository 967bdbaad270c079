//! Follow relations between users.

use crate::handlers::users::UserResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::user;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for following a user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FollowRequest {
    /// ID of the user to follow
    pub user_id: i32,
}

/// Request body for replacing the followings of a user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetFollowingsRequest {
    /// IDs of every user to follow; an empty list clears the followings
    pub user_ids: Vec<i32>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn database_error(context: &str, db_error: DbErr) -> HandlerError {
    error!("{}: {}", context, db_error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(context, "DATABASE_ERROR")),
    )
}

fn user_not_found(user_id: i32) -> HandlerError {
    warn!("User with ID {} not found", user_id);
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("User {} not found", user_id), "USER_NOT_FOUND")),
    )
}

async fn find_user(state: &AppState, user_id: i32) -> Result<user::Model, HandlerError> {
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| database_error("Failed to load user", e))?
        .ok_or_else(|| user_not_found(user_id))
}

fn user_list(users: Vec<user::Model>, message: &str) -> Json<ApiResponse<Vec<UserResponse>>> {
    Json(ApiResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        message: message.to_string(),
        success: true,
    })
}

/// Get the users a user follows
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/followings",
    tag = "followings",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Followings retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_followings(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, HandlerError> {
    trace!("Entering get_followings function for user_id: {}", user_id);
    let user = find_user(&state, user_id).await?;

    let followings = user
        .followings(&state.db)
        .await
        .map_err(|e| database_error("Failed to load followings", e))?;
    debug!("User {} follows {} users", user_id, followings.len());
    Ok(user_list(followings, "Followings retrieved successfully"))
}

/// Get the users following a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/followers",
    tag = "followings",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Followers retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_followers(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, HandlerError> {
    trace!("Entering get_followers function for user_id: {}", user_id);
    let user = find_user(&state, user_id).await?;

    let followers = user
        .followers(&state.db)
        .await
        .map_err(|e| database_error("Failed to load followers", e))?;
    debug!("User {} has {} followers", user_id, followers.len());
    Ok(user_list(followers, "Followers retrieved successfully"))
}

/// Follow a user
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/followings",
    tag = "followings",
    params(
        ("user_id" = i32, Path, description = "ID of the follower"),
    ),
    request_body = FollowRequest,
    responses(
        (status = 201, description = "User followed", body = ApiResponse<UserResponse>),
        (status = 200, description = "User was already followed", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn follow_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<FollowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), HandlerError> {
    trace!("Entering follow_user function: {} -> {}", user_id, request.user_id);
    let follower = find_user(&state, user_id).await?;
    let followee = find_user(&state, request.user_id).await?;

    let created = follower
        .follow(&state.db, followee.id)
        .await
        .map_err(|e| database_error("Failed to follow user", e))?;

    let (status, message) = if created {
        info!("User {} now follows {}", follower.id, followee.id);
        (StatusCode::CREATED, "User followed successfully")
    } else {
        debug!("User {} already follows {}", follower.id, followee.id);
        (StatusCode::OK, "User already followed")
    };

    Ok((
        status,
        Json(ApiResponse {
            data: UserResponse::from(followee),
            message: message.to_string(),
            success: true,
        }),
    ))
}

/// Replace the followings of a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/followings",
    tag = "followings",
    params(
        ("user_id" = i32, Path, description = "ID of the follower"),
    ),
    request_body = SetFollowingsRequest,
    responses(
        (status = 200, description = "Followings replaced", body = ApiResponse<Vec<UserResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn set_followings(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<SetFollowingsRequest>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, HandlerError> {
    trace!("Entering set_followings function for user_id: {}", user_id);
    let user = find_user(&state, user_id).await?;

    let wanted: BTreeSet<i32> = request.user_ids.iter().copied().collect();
    let found: BTreeSet<i32> = user::Entity::find()
        .filter(user::Column::Id.is_in(wanted.iter().copied()))
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to check users", e))?
        .into_iter()
        .map(|u| u.id)
        .collect();
    if let Some(missing) = wanted.difference(&found).next() {
        return Err(user_not_found(*missing));
    }

    user.set_followings(&state.db, &request.user_ids)
        .await
        .map_err(|e| database_error("Failed to replace followings", e))?;

    let followings = user
        .followings(&state.db)
        .await
        .map_err(|e| database_error("Failed to load followings", e))?;
    info!("User {} now follows {} users", user_id, followings.len());
    Ok(user_list(followings, "Followings updated successfully"))
}

/// Stop following a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/followings/{followee_id}",
    tag = "followings",
    params(
        ("user_id" = i32, Path, description = "ID of the follower"),
        ("followee_id" = i32, Path, description = "ID of the followed user"),
    ),
    responses(
        (status = 200, description = "User unfollowed", body = ApiResponse<String>),
        (status = 404, description = "User or following not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn unfollow_user(
    Path((user_id, followee_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, HandlerError> {
    trace!("Entering unfollow_user function: {} -> {}", user_id, followee_id);
    let user = find_user(&state, user_id).await?;

    let removed = user
        .unfollow(&state.db, followee_id)
        .await
        .map_err(|e| database_error("Failed to unfollow user", e))?;
    if !removed {
        warn!("User {} does not follow {}", user_id, followee_id);
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("User {} does not follow user {}", user_id, followee_id),
                "FOLLOWING_NOT_FOUND",
            )),
        ));
    }

    info!("User {} unfollowed {}", user_id, followee_id);
    Ok(Json(ApiResponse {
        data: format!("User {} unfollowed {}", user_id, followee_id),
        message: "User unfollowed successfully".to_string(),
        success: true,
    }))
}
