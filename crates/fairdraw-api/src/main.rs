use anyhow::Context;
use fairdraw_api::{create_app, AppState};
use fairdraw_entropy::MockChain;
use fairdraw_types::EngineConfig;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const BLOCK_INTERVAL: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("FAIRDRAW_CONFIG") {
        Ok(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("loading engine config from {path}"))?,
        Err(_) => EngineConfig::default(),
    };
    let addr = std::env::var("FAIRDRAW_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let chain = MockChain::new(1);
    let state = AppState::from_config(config, chain.clone())?;

    // Local chain produces a block every interval
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(BLOCK_INTERVAL);
        loop {
            ticker.tick().await;
            let height = chain.mine(1);
            tracing::trace!(height, "mined block");
        }
    });

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, "fairdraw API server running");

    axum::serve(listener, app).await?;
    Ok(())
}
