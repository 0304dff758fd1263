//! `safewalk-core` binary.

use std::sync::Arc;

use api::{router, AppState, Config};
use clap::Parser;
use database::Database;
use notifier::WebhookDispatcher;
use orchestrator::{OrchestratorConfig, SosSweeper, TripOrchestrator};
use route_planner::{provider_from_settings, RoutePlanner, TomTomConfig};
use secrecy::ExposeSecret;
use signed_channel::{ClientConfig, SignedClient, Signer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "safewalk-core", about = "SafeWalk trip safety core service")]
struct Cli {
    /// Listen on this port instead of the one in CORE_ADDR.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    info!(addr = %config.addr, "Starting SafeWalk core");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Outbound notifications to the bot gateway
    let signer = Signer::new(&config.shared_secret)?;
    let gateway = SignedClient::new(
        ClientConfig::new(config.gateway_base_url.clone())
            .with_timeouts(config.connect_timeout, config.read_timeout),
        signer.clone(),
    )?;
    let dispatcher = Arc::new(WebhookDispatcher::new(gateway));

    // Routing
    let provider = provider_from_settings(
        config.routing_api_key.as_ref().map(|key| key.expose_secret()),
        config.routing_stub_enabled,
        |key| TomTomConfig::new(key).with_timeouts(config.connect_timeout, config.read_timeout),
    );
    let planner = RoutePlanner::new(provider);

    let orchestrator = Arc::new(TripOrchestrator::new(
        db,
        planner,
        dispatcher,
        OrchestratorConfig {
            deviation_threshold_meters: config.deviation_threshold_meters,
        },
    ));

    tokio::spawn(SosSweeper::new(orchestrator.clone(), config.sos_sweep_interval).run());

    let app = router(AppState::new(orchestrator, signer));

    info!(addr = %config.addr, "SafeWalk core listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
