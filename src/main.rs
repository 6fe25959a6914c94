use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use galileo_api::auth::CredentialValidator;
use galileo_api::database::{DatabaseManager, PgTelemetryStore};
use galileo_api::services::TelemetryService;
use galileo_api::AppState;

#[derive(Parser)]
#[command(name = "galileo-api")]
#[command(about = "Galileo satellite raw-data query API")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides SERVER_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides SERVER_HOST)")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up POSTGRES_*, NATION, REALM_PUBLIC_KEY, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let config = galileo_api::config::config()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.server.log_filter)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Galileo API in {:?} mode", config.environment);

    let validator = CredentialValidator::from_config(&config.security)
        .context("failed to load token verification key")?;

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    let telemetry = TelemetryService::new(
        Arc::new(PgTelemetryStore::new(pool.clone())),
        config.database.nation.clone(),
    );
    let app = galileo_api::app(AppState::new(telemetry, validator));

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Galileo API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::disconnect(&pool).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
