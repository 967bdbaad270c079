//! Admin registration of the movie catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use model::entities::{genre, movie};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serde_json::Value as JsonValue;

use super::{AdminError, AdminModel, AdminSite, ModelAdmin};

#[async_trait]
impl AdminModel for movie::Entity {
    const APP_LABEL: &'static str = "movies";
    const MODEL_NAME: &'static str = "movie";

    fn fields() -> Vec<String> {
        ["id", "title", "genre", "genre_id"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Shows the genre by name.
    async fn present(db: &DatabaseConnection, mut rows: Vec<JsonValue>) -> Result<Vec<JsonValue>, DbErr> {
        let genre_id = |row: &JsonValue| {
            row.get("genre_id")
                .and_then(JsonValue::as_i64)
                .and_then(|id| i32::try_from(id).ok())
        };

        let genre_ids: Vec<i32> = rows.iter().filter_map(genre_id).collect();
        if genre_ids.is_empty() {
            return Ok(rows);
        }

        let names: HashMap<i32, String> = genre::Entity::find()
            .filter(genre::Column::Id.is_in(genre_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|genre| (genre.id, genre.name))
            .collect();

        for row in &mut rows {
            let name = genre_id(row).and_then(|id| names.get(&id)).cloned();
            if let Some(object) = row.as_object_mut() {
                object.insert(
                    "genre".to_string(),
                    name.map(JsonValue::String).unwrap_or(JsonValue::Null),
                );
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl AdminModel for genre::Entity {
    const APP_LABEL: &'static str = "movies";
    const MODEL_NAME: &'static str = "genre";
}

/// Registers `Movie` and `Genre` on the admin site.
pub fn register(site: &mut AdminSite) -> Result<(), AdminError> {
    site.register::<movie::Entity>(ModelAdmin::with_list_display(&["title", "genre"]))?;
    site.register::<genre::Entity>(ModelAdmin::with_list_display(&["name"]))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::setup_test_db;
    use sea_orm::{ActiveModelTrait, Set};

    fn catalog_site() -> AdminSite {
        let mut site = AdminSite::new("Test administration");
        register(&mut site).expect("Catalog registration failed");
        site
    }

    fn column_fields(site: &AdminSite, model_name: &str) -> Vec<String> {
        site.model("movies", model_name)
            .unwrap()
            .columns()
            .into_iter()
            .map(|column| column.field)
            .collect()
    }

    #[test]
    fn test_movie_and_genre_columns() {
        let site = catalog_site();

        assert_eq!(column_fields(&site, "movie"), vec!["title", "genre"]);
        assert_eq!(column_fields(&site, "genre"), vec!["name"]);
        assert!(site.is_registered::<movie::Entity>());
        assert!(site.is_registered::<genre::Entity>());
        assert_eq!(site.len(), 2);
    }

    #[test]
    fn test_registering_catalog_twice_is_rejected() {
        let mut site = catalog_site();

        let result = register(&mut site);
        assert!(matches!(result, Err(AdminError::AlreadyRegistered(label)) if label == "movies.movie"));

        let result = site.register::<genre::Entity>(ModelAdmin::default());
        assert!(matches!(result, Err(AdminError::AlreadyRegistered(label)) if label == "movies.genre"));
        assert_eq!(site.len(), 2);
    }

    #[test]
    fn test_unknown_list_display_field_is_rejected() {
        let mut site = AdminSite::new("Test administration");

        let result = site.register::<genre::Entity>(ModelAdmin::with_list_display(&["name", "rating"]));
        assert!(matches!(
            result,
            Err(AdminError::UnknownField { index: 1, ref field, .. }) if field == "rating"
        ));
        assert!(!site.is_registered::<genre::Entity>());

        let result = site.register::<genre::Entity>(ModelAdmin::with_list_display(&[]));
        assert!(matches!(result, Err(AdminError::EmptyListDisplay(_))));
    }

    #[test]
    fn test_index_groups_models_by_app() {
        let site = catalog_site();
        let index = site.index();

        assert_eq!(index.site_name, "Test administration");
        assert_eq!(index.apps.len(), 1);
        assert_eq!(index.apps[0].app_label, "movies");
        let models: Vec<&str> = index.apps[0].models.iter().map(|m| m.model_name.as_str()).collect();
        assert_eq!(models, vec!["genre", "movie"]);
        assert_eq!(index.apps[0].models[1].url, "/admin/movies/movie");
    }

    #[tokio::test]
    async fn test_movie_list_shows_genre_name() {
        let db = setup_test_db().await;
        let site = catalog_site();

        let noir = genre::ActiveModel {
            name: Set("Noir".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        movie::ActiveModel {
            title: Set("The Third Man".to_string()),
            genre_id: Set(noir.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let list = site.model("movies", "movie").unwrap().list(&db, 1, None).await.unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.results[0].values, vec![JsonValue::from("The Third Man"), JsonValue::from("Noir")]);

        let list = site.model("movies", "genre").unwrap().list(&db, 1, None).await.unwrap();
        assert_eq!(list.results[0].values, vec![JsonValue::from("Noir")]);
        assert_eq!(list.results[0].pk, JsonValue::from(noir.id));
    }
}
