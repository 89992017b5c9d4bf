//! Startup helpers for the Echo relay server.
//!
//! Configuration errors (including a missing `GEMINI_API_KEY`) abort startup.

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use crate::conversation::{ChatResult, EchoConfig};
use crate::server::{self, AppState};

/// Run the server (used by the `echo-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    tracing::info!("Starting Echo relay v{}", env!("CARGO_PKG_VERSION"));

    let config = match EchoConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!("Gemini endpoint: {}", config.provider.base_url);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = rt.block_on(async {
        let state = initialize(&config).await?;
        run_server_with_shutdown(state, &config, shutdown_signal()).await
    });

    if let Err(e) = result {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Echo relay stopped");
    ExitCode::SUCCESS
}

/// Install the global `tracing` subscriber (`RUST_LOG` aware, INFO by default).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if the store or the provider cannot be created.
pub async fn initialize(config: &EchoConfig) -> ChatResult<Arc<AppState>> {
    AppState::new(config).await
}

/// Run server with graceful shutdown.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    config: &EchoConfig,
    shutdown_signal: F,
) -> ChatResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    server::run_server_with_shutdown(state, &config.server, shutdown_signal).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
