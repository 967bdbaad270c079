use anyhow::Result;
use migration::{Migrator, Runner};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, trace};

use super::connect;

/// Applies every pending change unit in dependency order.
pub(crate) async fn apply_all(db: &DatabaseConnection) -> Result<()> {
    info!("Running database migrations");
    let runner = Runner::<Migrator>::new()?;

    match runner.migrate(db).await {
        Ok(applied) => {
            info!("Database migrations completed successfully");
            debug!("Applied {} change unit(s)", applied.len());
            Ok(())
        }
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            Err(e.into())
        }
    }
}

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");

    let db = connect(database_url).await?;
    apply_all(&db).await?;

    info!("Database initialization completed successfully!");
    Ok(())
}
