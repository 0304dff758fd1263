//! `safewalk-gateway` binary.

use std::sync::Arc;

use gateway::{router, Config, CoreClient, GatewayState, LoggingSender};
use signed_channel::{ClientConfig, SignedClient, Signer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, core = %config.core_base_url, "Starting SafeWalk gateway");

    let signer = Signer::new(&config.shared_secret)?;
    let core = CoreClient::new(SignedClient::new(
        ClientConfig::new(config.core_base_url.clone())
            .with_timeouts(config.connect_timeout, config.read_timeout),
        signer.clone(),
    )?);
    if !core.is_healthy().await {
        warn!(core = %config.core_base_url, "Core service is not reachable yet");
    }

    // No chat adapter is wired; notifications are logged.
    let app = router(GatewayState::new(Arc::new(LoggingSender), signer));

    info!(addr = %config.addr, "SafeWalk gateway listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
