pub mod initdb;
pub mod migrate;
pub mod migrate_and_serve;
pub mod serve;
pub mod show_migrations;

pub use initdb::init_database;
pub use migrate::migrate;
pub use migrate_and_serve::migrate_and_serve;
pub use serve::serve;
pub use show_migrations::show_migrations;

use anyhow::Result;
use sea_orm::{Database, DatabaseConnection};
use tracing::{debug, error, info, trace};

/// Connects to the database, logging the outcome.
pub(crate) async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    trace!("Attempting to connect to database");
    match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            debug!("Database URL: {}", database_url);
            Ok(connection)
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            Err(e.into())
        }
    }
}
