use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use autotipp::config::{Config, RetryPolicy};
use autotipp::error::Result;
use autotipp::infrastructure::{LogSink, SnapshotSession};
use autotipp::services::TipPipeline;

#[tokio::main]
async fn main() {
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.args.log_level))
        .init();

    if let Err(e) = run(config).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(mut config: Config) -> Result<()> {
    info!(
        "Tipping from {} (overwrite={}, window={}h, timezone={})",
        config.args.page.display(),
        config.overwrite_tips,
        config.tip_threshold.num_hours(),
        config.timezone,
    );

    // The snapshot backend never lags, so skip the inter-attempt waits.
    config.retry = RetryPolicy::immediate();

    let session = Arc::new(SnapshotSession::from_file(&config.args.page)?);
    let mut pipeline = TipPipeline::new(session, Arc::new(LogSink), config);
    pipeline.tip_all_games().await?;

    Ok(())
}
