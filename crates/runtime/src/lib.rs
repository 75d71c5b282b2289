//! Service assembly: configuration in, ready-to-serve router out.

pub mod telemetry;

use sqlx::SqlitePool;
use std::sync::Arc;
use tasklane_config::AppConfig;
use tasklane_database::initialize_database;
use tasklane_gateway::GatewayState;
use tracing::info;

pub struct BackendServices {
    pub config: AppConfig,
    pub pool: SqlitePool,
    pub state: Arc<GatewayState>,
}

impl BackendServices {
    /// Connect to the database, run migrations, and wire up every service
    /// behind the gateway.
    pub async fn initialise(config: AppConfig) -> anyhow::Result<Self> {
        let pool = initialize_database(&config.database).await?;
        info!(url = %config.database.url, "database ready");

        let state = Arc::new(GatewayState::new(pool.clone(), &config)?);

        Ok(Self {
            config,
            pool,
            state,
        })
    }

    pub fn router(&self) -> axum::Router {
        tasklane_gateway::create_router(self.state.clone())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.config.http.address, self.config.http.port)
    }
}

/// Resolve on SIGINT or SIGTERM so the server can drain connections.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to install sigterm handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn initialise_builds_a_router() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.database.url = format!(
            "sqlite://{}",
            temp_dir.path().join("runtime.db").display()
        );
        config.database.max_connections = 1;

        let services = BackendServices::initialise(config).await.unwrap();
        assert_eq!(services.bind_address(), "127.0.0.1:8100");
        let _router = services.router();
    }
}
