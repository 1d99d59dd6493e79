//! Standalone daily alert job.

use std::sync::Arc;

use smartair_infra::{AlertConfig, AlertDispatcher, AlertScheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    smartair_observability::init();

    let config = AlertConfig::from_env()?;
    let dispatcher = Arc::new(AlertDispatcher::from_config(&config)?);

    tracing::info!(at = %config.schedule.at, csv = %config.subscribers_csv.display(), "starting alert scheduler");
    let handle = AlertScheduler::new(config.schedule.clone()).spawn("alert-scheduler", dispatcher);

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    handle.shutdown().await;

    Ok(())
}
