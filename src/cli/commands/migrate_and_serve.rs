use anyhow::Result;
use tracing::{info, trace};

use super::initdb::apply_all;
use super::{connect, serve};

pub async fn migrate_and_serve(database_url: &str, bind_address: &str) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");

    // The migration connection is dropped before the server opens its own pool
    {
        let db = connect(database_url).await?;
        apply_all(&db).await?;
    }

    serve(database_url, bind_address).await
}
