//! Auto-generated administrative CRUD views over SeaORM entities.
//!
//! An entity becomes manageable by implementing [`AdminModel`] and being
//! registered on an [`AdminSite`] together with a [`ModelAdmin`]
//! configuration. The site then serves list, detail, create, update and
//! delete operations for it.

pub mod catalog;
mod entity;
mod site;

pub use entity::AdminBinding;
pub use site::AdminSite;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, IdenStatic, Iterable, SqlErr};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use utoipa::ToSchema;

/// Number of rows in a list page when the configuration does not say otherwise.
pub const DEFAULT_LIST_PER_PAGE: u64 = 100;

/// Error types for the admin site
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("The model {0} is already registered")]
    AlreadyRegistered(String),

    #[error("The value of 'list_display[{index}]' refers to '{field}', which is not a field of {model}")]
    UnknownField {
        model: String,
        index: usize,
        field: String,
    },

    #[error("The value of 'list_display' for {0} must not be empty")]
    EmptyListDisplay(String),

    #[error("Model {0} is not registered")]
    NotRegistered(String),

    #[error("{model} with primary key {id} does not exist")]
    ObjectNotFound { model: String, id: i32 },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for AdminError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => return AdminError::Conflict(message),
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => return AdminError::InvalidData(message),
            _ => {}
        }

        match err {
            DbErr::Json(message) => AdminError::InvalidData(message),
            other => AdminError::Database(other),
        }
    }
}

/// Admin configuration for one registered model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelAdmin {
    /// Fields shown as columns of the list view, in order.
    pub list_display: Vec<&'static str>,
    pub list_per_page: u64,
}

impl Default for ModelAdmin {
    fn default() -> Self {
        Self {
            list_display: vec!["id"],
            list_per_page: DEFAULT_LIST_PER_PAGE,
        }
    }
}

impl ModelAdmin {
    pub fn with_list_display(fields: &[&'static str]) -> Self {
        Self {
            list_display: fields.to_vec(),
            ..Default::default()
        }
    }

    pub fn list_per_page(mut self, list_per_page: u64) -> Self {
        self.list_per_page = list_per_page;
        self
    }
}

/// An entity that can be managed through the admin site.
#[async_trait]
pub trait AdminModel: EntityTrait {
    /// Label of the app owning the model, e.g. `movies`.
    const APP_LABEL: &'static str;
    /// Lowercase model name used in URLs, e.g. `movie`.
    const MODEL_NAME: &'static str;

    /// Attribute names that may appear in `list_display`.
    fn fields() -> Vec<String> {
        Self::Column::iter()
            .map(|column| column.as_str().to_string())
            .collect()
    }

    /// Decorates rows before they are shown, e.g. to resolve a foreign key
    /// to the display value of the related object.
    async fn present(_db: &DatabaseConnection, rows: Vec<JsonValue>) -> Result<Vec<JsonValue>, DbErr> {
        Ok(rows)
    }
}

/// `"genre_id"` -> `"Genre id"`
pub fn humanize_field_name(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Column definition of a list view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ColumnInfo {
    /// Field name
    pub field: String,
    /// Human readable label
    pub label: String,
}

/// One row of a list view
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminRow {
    /// Primary key of the object
    #[schema(value_type = Object)]
    pub pk: JsonValue,
    /// Values aligned with the list columns
    #[schema(value_type = Vec<Object>)]
    pub values: Vec<JsonValue>,
}

/// Response for the list view
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    pub app_label: String,
    pub model_name: String,
    pub verbose_name: String,
    /// Columns from `list_display`, in order
    pub columns: Vec<ColumnInfo>,
    pub results: Vec<AdminRow>,
    /// Total count of objects
    pub count: u64,
    /// Current page (1-based)
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// A model listed on the admin index
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ModelEntry {
    pub model_name: String,
    pub verbose_name: String,
    /// URL of the list view
    pub url: String,
    /// Columns of the list view
    pub list_display: Vec<String>,
}

/// An app and its registered models
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AppEntry {
    pub app_label: String,
    pub name: String,
    pub models: Vec<ModelEntry>,
}

/// Response for the admin index
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminIndexResponse {
    pub site_name: String,
    pub apps: Vec<AppEntry>,
}
