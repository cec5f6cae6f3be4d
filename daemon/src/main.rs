mod config;
mod protocol;
mod server;
mod util;

use anyhow::Result;
use config::DaemonConfig;
use pancake_core::Baker;
use server::BakerServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DaemonConfig::load()?;
    info!(
        listen = %config.server.listen_addr(),
        idle_timeout_ms = config.server.idle_timeout_ms,
        seeded = config.baker.seed.is_some(),
        "loaded pancake baker config"
    );
    let baker = match config.baker.seed {
        Some(seed) => Baker::with_seed(seed),
        None => Baker::new(),
    };
    let server = BakerServer::new(config.server.clone(), baker);
    server.run().await
}
