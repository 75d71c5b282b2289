use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tasklane_runtime::{shutdown_signal, telemetry, BackendServices};
use tracing::info;

/// Tasklane backend server.
#[derive(Debug, Parser)]
#[command(name = "tasklane-server", version, about)]
struct Args {
    /// Path to a configuration file. Falls back to the `TASKLANE_CONFIG`
    /// environment variable and the default search locations.
    #[arg(long, env = "TASKLANE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing("info,tasklane=debug");

    let args = Args::parse();
    let config = tasklane_config::load_from(args.config).context("loading configuration")?;

    let services = BackendServices::initialise(config)
        .await
        .context("initialising services")?;

    let address = services.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "tasklane server listening");

    axum::serve(listener, services.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}
