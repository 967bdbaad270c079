use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use sea_orm::{ActiveModelBehavior, ActiveModelTrait, IntoActiveModel, PrimaryKeyTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::entity::EntityAdmin;
use super::{
    humanize_field_name, AdminBinding, AdminError, AdminIndexResponse, AdminModel, AppEntry,
    ModelAdmin, ModelEntry,
};

type ModelKey = (&'static str, &'static str);

/// Registry of the models managed through the admin interface.
///
/// Built once at startup and read-only afterwards.
pub struct AdminSite {
    site_name: String,
    models: BTreeMap<ModelKey, Arc<dyn AdminBinding>>,
    entities: HashMap<TypeId, ModelKey>,
}

impl AdminSite {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            models: BTreeMap::new(),
            entities: HashMap::new(),
        }
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Registers entity `E` with the given configuration.
    ///
    /// Fails if `E` (or another entity with the same app label and model
    /// name) is already registered, or if `list_display` names something
    /// that is not a field of `E`.
    pub fn register<E>(&mut self, admin: ModelAdmin) -> Result<(), AdminError>
    where
        E: AdminModel,
        E::Model: IntoActiveModel<E::ActiveModel> + Serialize + for<'de> Deserialize<'de> + Send + Sync,
        E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
    {
        let key: ModelKey = (E::APP_LABEL, E::MODEL_NAME);
        let label = format!("{}.{}", E::APP_LABEL, E::MODEL_NAME);

        if self.entities.contains_key(&TypeId::of::<E>()) || self.models.contains_key(&key) {
            error!("Admin registration rejected: {} is already registered", label);
            return Err(AdminError::AlreadyRegistered(label));
        }

        if admin.list_display.is_empty() {
            return Err(AdminError::EmptyListDisplay(label));
        }

        let fields = E::fields();
        for (index, field) in admin.list_display.iter().enumerate() {
            if !fields.iter().any(|known| known == field) {
                error!("Admin registration rejected: {} has no field '{}'", label, field);
                return Err(AdminError::UnknownField {
                    model: label,
                    index,
                    field: field.to_string(),
                });
            }
        }

        debug!("Registering {} with list_display {:?}", label, admin.list_display);
        self.models.insert(key, Arc::new(EntityAdmin::<E>::new(admin)));
        self.entities.insert(TypeId::of::<E>(), key);
        info!("Registered {} on admin site", label);
        Ok(())
    }

    pub fn is_registered<E: AdminModel>(&self) -> bool {
        self.entities.contains_key(&TypeId::of::<E>())
    }

    /// Looks up the CRUD views of a registered model.
    pub fn model(&self, app_label: &str, model_name: &str) -> Result<Arc<dyn AdminBinding>, AdminError> {
        self.models
            .iter()
            .find(|((app, model), _)| *app == app_label && *model == model_name)
            .map(|(_, binding)| Arc::clone(binding))
            .ok_or_else(|| AdminError::NotRegistered(format!("{}.{}", app_label, model_name)))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Registered models grouped by app, both sorted by name.
    pub fn index(&self) -> AdminIndexResponse {
        let mut apps: Vec<AppEntry> = Vec::new();

        for ((app_label, model_name), binding) in &self.models {
            let entry = ModelEntry {
                model_name: model_name.to_string(),
                verbose_name: humanize_field_name(model_name),
                url: format!("/admin/{}/{}", app_label, model_name),
                list_display: binding
                    .model_admin()
                    .list_display
                    .iter()
                    .map(|field| field.to_string())
                    .collect(),
            };

            match apps.last_mut() {
                Some(app) if app.app_label == *app_label => app.models.push(entry),
                _ => apps.push(AppEntry {
                    app_label: app_label.to_string(),
                    name: humanize_field_name(app_label),
                    models: vec![entry],
                }),
            }
        }

        AdminIndexResponse {
            site_name: self.site_name.clone(),
            apps,
        }
    }
}

impl fmt::Debug for AdminSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSite")
            .field("site_name", &self.site_name)
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}
