pub mod api;
pub mod assistant; // AI business assistant + Telegram sales bot
pub mod calendar;
pub mod config;
pub mod core_state;
pub mod db;
pub mod filters;
pub mod format;
pub mod mock_data;
pub mod models;
pub mod notifications;
pub mod preferences;
pub mod relay; // Chat-completions relay

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Start the back office and serve until Ctrl-C.
pub async fn run() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    tracing::info!(
        listen = %config.listen,
        data_dir = %config.data_dir.display(),
        ai_url = %config.ai_url,
        seed = config.seed,
        "Configuration loaded"
    );

    let core = Arc::new(core_state::CoreState::from_config(&config)?);
    let mut server = api::start_api_server(core, config.listen).await?;
    tracing::info!(addr = %server.local_addr(), "Serving /api");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    server.shutdown();
    server.stopped().await;
    Ok(())
}
