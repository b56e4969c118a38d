use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting opioid-qa-server");

    // Load config
    let config = opioid_qa_core::AppConfig::from_env()?;
    let addr = config.bind_addr();

    // PDF extraction is blocking; it runs once before the listener opens.
    let deps = tokio::task::spawn_blocking(move || opioid_qa_core::ServerDeps::from_config(config))
        .await??;

    if deps.orchestrator.corpus().is_sentinel() {
        tracing::warn!("Reference document unavailable; answers will be grounded on placeholder text");
    }

    let app = routes::build_router(Arc::new(deps));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
