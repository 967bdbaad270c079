use crate::admin::{AdminError, AdminIndexResponse, ListResponse};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters of the admin list view
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams, Validate)]
pub struct AdminListQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: the model's `list_per_page`)
    #[validate(range(min = 1, max = 1000))]
    pub page_size: Option<u64>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Maps admin failures to a status code and error body.
fn admin_error(err: AdminError) -> HandlerError {
    let (status, code) = match &err {
        AdminError::NotRegistered(_) => (StatusCode::NOT_FOUND, "MODEL_NOT_FOUND"),
        AdminError::ObjectNotFound { .. } => (StatusCode::NOT_FOUND, "OBJECT_NOT_FOUND"),
        AdminError::InvalidData(_) => (StatusCode::BAD_REQUEST, "INVALID_DATA"),
        AdminError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        AdminError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        AdminError::AlreadyRegistered(_)
        | AdminError::UnknownField { .. }
        | AdminError::EmptyListDisplay(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ADMIN_CONFIGURATION_ERROR"),
    };

    if status.is_server_error() {
        error!("Admin request failed: {}", err);
    } else {
        warn!("Admin request rejected: {}", err);
    }
    (status, Json(ErrorResponse::new(err.to_string(), code)))
}

/// Admin index listing every registered model
#[utoipa::path(
    get,
    path = "/admin",
    tag = "admin",
    responses(
        (status = 200, description = "Registered models", body = ApiResponse<AdminIndexResponse>)
    )
)]
#[instrument]
pub async fn admin_index(State(state): State<AppState>) -> Json<ApiResponse<AdminIndexResponse>> {
    trace!("Entering admin_index function");
    let index = state.admin.index();
    debug!("Admin index lists {} apps", index.apps.len());

    Json(ApiResponse {
        data: index,
        message: "Admin index retrieved successfully".to_string(),
        success: true,
    })
}

/// List objects of a registered model
#[utoipa::path(
    get,
    path = "/admin/{app_label}/{model_name}",
    tag = "admin",
    params(
        ("app_label" = String, Path, description = "App label, e.g. movies"),
        ("model_name" = String, Path, description = "Model name, e.g. movie"),
        AdminListQuery
    ),
    responses(
        (status = 200, description = "Objects retrieved successfully", body = ApiResponse<ListResponse>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 404, description = "Model not registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn list_objects(
    Path((app_label, model_name)): Path<(String, String)>,
    Valid(Query(query)): Valid<Query<AdminListQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ListResponse>>, HandlerError> {
    trace!("Entering list_objects function for {}.{}", app_label, model_name);
    let model = state.admin.model(&app_label, &model_name).map_err(admin_error)?;

    let page = query.page.unwrap_or(1);
    let list = model
        .list(&state.db, page, query.page_size)
        .await
        .map_err(admin_error)?;
    info!("Listed {} {} objects on page {}", list.results.len(), model_name, page);

    Ok(Json(ApiResponse {
        data: list,
        message: "Objects retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create an object of a registered model
#[utoipa::path(
    post,
    path = "/admin/{app_label}/{model_name}",
    tag = "admin",
    params(
        ("app_label" = String, Path, description = "App label"),
        ("model_name" = String, Path, description = "Model name"),
    ),
    request_body = Object,
    responses(
        (status = 201, description = "Object created successfully", body = Object),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 404, description = "Model not registered", body = ErrorResponse),
        (status = 409, description = "Unique constraint violated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_object(
    Path((app_label, model_name)): Path<(String, String)>,
    State(state): State<AppState>,
    Json(data): Json<JsonValue>,
) -> Result<(StatusCode, Json<ApiResponse<JsonValue>>), HandlerError> {
    trace!("Entering create_object function for {}.{}", app_label, model_name);
    let model = state.admin.model(&app_label, &model_name).map_err(admin_error)?;

    let object = model.create(&state.db, data).await.map_err(admin_error)?;
    info!("Created {}.{} object", app_label, model_name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: object,
            message: "Object created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Get one object of a registered model
#[utoipa::path(
    get,
    path = "/admin/{app_label}/{model_name}/{object_id}",
    tag = "admin",
    params(
        ("app_label" = String, Path, description = "App label"),
        ("model_name" = String, Path, description = "Model name"),
        ("object_id" = i32, Path, description = "Primary key of the object"),
    ),
    responses(
        (status = 200, description = "Object retrieved successfully", body = Object),
        (status = 404, description = "Model or object not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_object(
    Path((app_label, model_name, object_id)): Path<(String, String, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<JsonValue>>, HandlerError> {
    trace!("Entering get_object function for {}.{} {}", app_label, model_name, object_id);
    let model = state.admin.model(&app_label, &model_name).map_err(admin_error)?;

    let object = model.retrieve(&state.db, object_id).await.map_err(admin_error)?;
    Ok(Json(ApiResponse {
        data: object,
        message: "Object retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update an object of a registered model
///
/// Attributes missing from the body keep their current value.
#[utoipa::path(
    put,
    path = "/admin/{app_label}/{model_name}/{object_id}",
    tag = "admin",
    params(
        ("app_label" = String, Path, description = "App label"),
        ("model_name" = String, Path, description = "Model name"),
        ("object_id" = i32, Path, description = "Primary key of the object"),
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Object updated successfully", body = Object),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 404, description = "Model or object not found", body = ErrorResponse),
        (status = 409, description = "Unique constraint violated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_object(
    Path((app_label, model_name, object_id)): Path<(String, String, i32)>,
    State(state): State<AppState>,
    Json(data): Json<JsonValue>,
) -> Result<Json<ApiResponse<JsonValue>>, HandlerError> {
    trace!("Entering update_object function for {}.{} {}", app_label, model_name, object_id);
    let model = state.admin.model(&app_label, &model_name).map_err(admin_error)?;

    let object = model
        .update(&state.db, object_id, data)
        .await
        .map_err(admin_error)?;
    info!("Updated {}.{} object {}", app_label, model_name, object_id);

    Ok(Json(ApiResponse {
        data: object,
        message: "Object updated successfully".to_string(),
        success: true,
    }))
}

/// Delete an object of a registered model
#[utoipa::path(
    delete,
    path = "/admin/{app_label}/{model_name}/{object_id}",
    tag = "admin",
    params(
        ("app_label" = String, Path, description = "App label"),
        ("model_name" = String, Path, description = "Model name"),
        ("object_id" = i32, Path, description = "Primary key of the object"),
    ),
    responses(
        (status = 200, description = "Object deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Model or object not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_object(
    Path((app_label, model_name, object_id)): Path<(String, String, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, HandlerError> {
    trace!("Entering delete_object function for {}.{} {}", app_label, model_name, object_id);
    let model = state.admin.model(&app_label, &model_name).map_err(admin_error)?;

    model.delete(&state.db, object_id).await.map_err(admin_error)?;
    info!("Deleted {}.{} object {}", app_label, model_name, object_id);

    Ok(Json(ApiResponse {
        data: format!("{} {} deleted", model_name, object_id),
        message: "Object deleted successfully".to_string(),
        success: true,
    }))
}
