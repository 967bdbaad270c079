use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, IdenStatic,
    IntoActiveModel, Iterable, PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait, QueryOrder,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{debug, trace, warn};

use super::{humanize_field_name, AdminError, AdminModel, AdminRow, ColumnInfo, ListResponse, ModelAdmin};

/// Type-erased CRUD operations of one registered model.
#[async_trait]
pub trait AdminBinding: Send + Sync {
    fn app_label(&self) -> &'static str;

    fn model_name(&self) -> &'static str;

    fn model_admin(&self) -> &ModelAdmin;

    fn columns(&self) -> Vec<ColumnInfo> {
        self.model_admin()
            .list_display
            .iter()
            .map(|field| ColumnInfo {
                field: field.to_string(),
                label: humanize_field_name(field),
            })
            .collect()
    }

    async fn list(
        &self,
        db: &DatabaseConnection,
        page: u64,
        page_size: Option<u64>,
    ) -> Result<ListResponse, AdminError>;

    async fn retrieve(&self, db: &DatabaseConnection, object_id: i32) -> Result<JsonValue, AdminError>;

    async fn create(&self, db: &DatabaseConnection, data: JsonValue) -> Result<JsonValue, AdminError>;

    async fn update(
        &self,
        db: &DatabaseConnection,
        object_id: i32,
        data: JsonValue,
    ) -> Result<JsonValue, AdminError>;

    async fn delete(&self, db: &DatabaseConnection, object_id: i32) -> Result<(), AdminError>;
}

/// Generic CRUD views for a SeaORM entity with an integer primary key.
pub(super) struct EntityAdmin<E> {
    admin: ModelAdmin,
    _entity: PhantomData<E>,
}

impl<E: AdminModel> EntityAdmin<E> {
    pub(super) fn new(admin: ModelAdmin) -> Self {
        Self {
            admin,
            _entity: PhantomData,
        }
    }

    fn pk_field() -> String {
        E::PrimaryKey::iter()
            .next()
            .map(|pk| pk.into_column().as_str().to_string())
            .unwrap_or_else(|| "id".to_string())
    }

    fn not_found(object_id: i32) -> AdminError {
        AdminError::ObjectNotFound {
            model: E::MODEL_NAME.to_string(),
            id: object_id,
        }
    }

    /// Columns named by the keys of `data`; other keys are ignored.
    fn provided_columns(data: &JsonMap<String, JsonValue>) -> Vec<E::Column> {
        E::Column::iter()
            .filter(|column| data.contains_key(column.as_str()))
            .collect()
    }

    fn to_row(model: &E::Model) -> Result<JsonValue, AdminError>
    where
        E::Model: Serialize,
    {
        serde_json::to_value(model).map_err(|e| AdminError::InvalidData(e.to_string()))
    }

    async fn present_one(db: &DatabaseConnection, row: JsonValue) -> Result<JsonValue, AdminError> {
        let mut rows = E::present(db, vec![row]).await?;
        rows.pop()
            .ok_or_else(|| AdminError::InvalidData("object could not be presented".to_string()))
    }
}

fn require_object(data: JsonValue) -> Result<JsonMap<String, JsonValue>, AdminError> {
    match data {
        JsonValue::Object(fields) => Ok(fields),
        _ => Err(AdminError::InvalidData("expected a JSON object".to_string())),
    }
}

/// Deserializes `data` laid over `base`, the keys of `data` taking precedence.
fn merge_model<M>(mut base: JsonMap<String, JsonValue>, data: JsonMap<String, JsonValue>) -> Result<M, AdminError>
where
    M: for<'de> Deserialize<'de>,
{
    base.extend(data);
    serde_json::from_value(JsonValue::Object(base)).map_err(|e| AdminError::InvalidData(e.to_string()))
}

#[async_trait]
impl<E> AdminBinding for EntityAdmin<E>
where
    E: AdminModel,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + for<'de> Deserialize<'de> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    fn app_label(&self) -> &'static str {
        E::APP_LABEL
    }

    fn model_name(&self) -> &'static str {
        E::MODEL_NAME
    }

    fn model_admin(&self) -> &ModelAdmin {
        &self.admin
    }

    async fn list(
        &self,
        db: &DatabaseConnection,
        page: u64,
        page_size: Option<u64>,
    ) -> Result<ListResponse, AdminError> {
        let page = page.max(1);
        let page_size = page_size.unwrap_or(self.admin.list_per_page).max(1);
        trace!("Listing {}.{} page {} ({} per page)", E::APP_LABEL, E::MODEL_NAME, page, page_size);

        let mut query = E::find();
        for pk in E::PrimaryKey::iter() {
            query = query.order_by_asc(pk.into_column());
        }

        let paginator = query.into_json().paginate(db, page_size);
        let totals = paginator.num_items_and_pages().await?;
        let rows = paginator.fetch_page(page - 1).await?;
        let rows = E::present(db, rows).await?;

        let pk_field = Self::pk_field();
        let results = rows
            .iter()
            .map(|row| AdminRow {
                pk: row.get(&pk_field).cloned().unwrap_or(JsonValue::Null),
                values: self
                    .admin
                    .list_display
                    .iter()
                    .map(|field| row.get(*field).cloned().unwrap_or(JsonValue::Null))
                    .collect(),
            })
            .collect::<Vec<_>>();
        debug!("Listed {} of {} {} objects", results.len(), totals.number_of_items, E::MODEL_NAME);

        Ok(ListResponse {
            app_label: E::APP_LABEL.to_string(),
            model_name: E::MODEL_NAME.to_string(),
            verbose_name: humanize_field_name(E::MODEL_NAME),
            columns: self.columns(),
            results,
            count: totals.number_of_items,
            page,
            page_size,
            total_pages: totals.number_of_pages,
        })
    }

    async fn retrieve(&self, db: &DatabaseConnection, object_id: i32) -> Result<JsonValue, AdminError> {
        let row = E::find_by_id(object_id)
            .into_json()
            .one(db)
            .await?
            .ok_or_else(|| Self::not_found(object_id))?;
        Self::present_one(db, row).await
    }

    async fn create(&self, db: &DatabaseConnection, data: JsonValue) -> Result<JsonValue, AdminError> {
        let data = require_object(data)?;
        let provided = Self::provided_columns(&data);

        // Placeholder keys so a model without its primary key still deserializes
        let mut base = JsonMap::new();
        for pk in E::PrimaryKey::iter() {
            base.insert(pk.into_column().as_str().to_string(), JsonValue::from(0));
        }
        let values = merge_model::<E::Model>(base, data)?.into_active_model();

        let mut active_model = <E::ActiveModel as ActiveModelTrait>::default();
        for column in provided {
            if let Some(value) = values.get(column).into_value() {
                active_model.set(column, value);
            }
        }
        let model = active_model.insert(db).await?;
        debug!("Created {} object", E::MODEL_NAME);

        Self::present_one(db, Self::to_row(&model)?).await
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        object_id: i32,
        data: JsonValue,
    ) -> Result<JsonValue, AdminError> {
        let mut data = require_object(data)?;
        let existing = E::find_by_id(object_id)
            .one(db)
            .await?
            .ok_or_else(|| Self::not_found(object_id))?;

        // Primary key values are kept, only the other attributes change
        for pk in E::PrimaryKey::iter() {
            data.remove(pk.into_column().as_str());
        }
        let provided = Self::provided_columns(&data);
        if provided.is_empty() {
            debug!("Nothing to update on {} object {}", E::MODEL_NAME, object_id);
            return Self::present_one(db, Self::to_row(&existing)?).await;
        }

        let base = require_object(Self::to_row(&existing)?)?;
        let values = merge_model::<E::Model>(base, data)?.into_active_model();

        let mut active_model = existing.into_active_model();
        for column in provided {
            if let Some(value) = values.get(column).into_value() {
                active_model.set(column, value);
            }
        }
        let model = active_model.update(db).await?;
        debug!("Updated {} object {}", E::MODEL_NAME, object_id);

        Self::present_one(db, Self::to_row(&model)?).await
    }
    async fn delete(&self, db: &DatabaseConnection, object_id: i32) -> Result<(), AdminError> {
        let result = E::delete_by_id(object_id).exec(db).await?;
        if result.rows_affected == 0 {
            warn!("{} object {} not found for deletion", E::MODEL_NAME, object_id);
            return Err(Self::not_found(object_id));
        }
        Ok(())
    }
}
