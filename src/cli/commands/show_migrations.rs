use anyhow::Result;
use migration::{ChangeStatus, Migrator, Runner};
use tracing::trace;

use super::connect;

pub async fn show_migrations(database_url: &str) -> Result<()> {
    trace!("Entering show_migrations function");
    let db = connect(database_url).await?;

    let status = Runner::<Migrator>::new()?.status(&db).await?;
    for line in format_status(&status) {
        println!("{}", line);
    }
    Ok(())
}

/// One `[X] app.name` line per change unit, `[ ]` while pending.
fn format_status(status: &[ChangeStatus]) -> Vec<String> {
    status
        .iter()
        .map(|entry| format!("[{}] {}", if entry.applied { "X" } else { " " }, entry.id))
        .collect()
}
