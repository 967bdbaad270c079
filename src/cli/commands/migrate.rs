use anyhow::Result;
use migration::{Migrator, Runner};
use tracing::{info, trace};

use super::connect;
use super::initdb::apply_all;

/// Applies pending change units, or only those `target` needs.
pub async fn migrate(database_url: &str, target: Option<&str>) -> Result<()> {
    trace!("Entering migrate function");
    let db = connect(database_url).await?;

    let Some(target) = target else {
        return apply_all(&db).await;
    };

    let runner = Runner::<Migrator>::new()?;
    let target = runner.resolve(target)?;
    info!("Migrating to {}", target);

    let applied = runner.migrate_to(&db, target).await?;
    if applied.is_empty() {
        println!("No migrations to apply.");
    }
    for id in applied {
        println!("  Applying {}... OK", id);
    }
    Ok(())
}
