use std::sync::Arc;

use anyhow::Result;
use sea_orm::Database;
use tracing::{debug, info, warn};

use crate::admin::{catalog, AdminSite};
use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://movieclub.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const SITE_NAME: &str = "MovieClub administration";

/// Builds the admin site with every model the application exposes.
pub fn build_admin_site() -> Result<AdminSite> {
    let mut site = AdminSite::new(SITE_NAME);
    catalog::register(&mut site)?;
    if site.is_empty() {
        warn!("{} has no registered models", site.site_name());
    }
    debug!("Admin site built with {} models", site.len());
    Ok(site)
}

/// Initialize application state for the given database
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let admin = Arc::new(build_admin_site()?);

    Ok(AppState { db, admin })
}
