use anyhow::Context;
use tracing::info;

use crate::presentation::state::AppState;

pub async fn serve(state: &AppState) -> anyhow::Result<()> {
    let scheduler = &state.services.scheduler;
    let armed = scheduler.start().await?;
    info!("🚀 Serving {} task(s), press Ctrl-C to stop", armed);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("🛑 Shutdown requested");
    scheduler.stop().await;
    state.db.pool().close().await;
    Ok(())
}
