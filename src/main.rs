use anyhow::Result;
use fsg_content::{config, server};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the host)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fsg_content=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = config::Config::from_env()?;
    info!("Starting content service in {:?} mode", config.mode);

    let state = Arc::new(server::AppState::from_config(&config));
    info!(
        "Content backend: {} (local fallback: {})",
        state.content.primary_name(),
        state.content.local_name().unwrap_or("none")
    );
    info!("Media backend: {}", state.media.backend_name());

    // `--seed` copies data/content.json into the hosted backend and exits.
    if std::env::args().any(|arg| arg == "--seed") {
        if state.content.seed_from_file().await? {
            info!("Content migrated from file to hosted backend");
        } else {
            info!("Nothing to seed: no hosted backend or no content file");
        }
        return Ok(());
    }

    server::serve(&config, state).await
}
