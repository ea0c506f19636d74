//! muster bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p muster-bot
//! ```
//!
//! Configuration is loaded from environment variables (and `.env` when present).

use muster_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Configuration decides the log format, so it is loaded first
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, code = e.error_code(), "Bot stopped");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), muster_common::AppError> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        guild_id = %config.discord.guild_id,
        store = ?config.store.backend,
        port = config.http.port,
        "Starting muster..."
    );

    muster_bot::run(config).await
}
