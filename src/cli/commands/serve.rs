use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::admin::AdminSite;
use crate::config::initialize_app_state_with_url;
use crate::router::create_router;

pub async fn serve(database_url: &str, bind_address: &str) -> Result<()> {
    trace!("Entering serve function");
    info!("MovieClub application starting up");
    debug!("Database URL: {}", database_url);

    let state = initialize_app_state_with_url(database_url).await.map_err(|e| {
        error!("Failed to initialize application state: {}", e);
        e
    })?;
    log_admin_models(&state.admin);

    let app = create_router(state);

    let listener = TcpListener::bind(bind_address).await.map_err(|e| {
        error!("Failed to bind to address {}: {}", bind_address, e);
        e
    })?;

    info!("MovieClub API server running on http://{}", bind_address);
    info!("Admin site available at http://{}/admin", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}

fn log_admin_models(site: &AdminSite) {
    info!("{} serving {} models", site.site_name(), site.len());
    for app in site.index().apps {
        for model in app.models {
            debug!("{}.{} at {} showing {:?}", app.app_label, model.model_name, model.url, model.list_display);
        }
    }
}
