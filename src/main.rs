mod cli;

use std::sync::Arc;

use deliveet_client::config::Config;
use deliveet_client::error::ClientError;
use deliveet_client::state::AppState;
use deliveet_client::store::persist::FileSessionStorage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    let storage = Arc::new(FileSessionStorage::new(config.session_file.clone()));
    let state = AppState::new(&config, storage)?;

    tracing::debug!(api_url = %config.api_url, "client started");

    cli::run(&state).await
}
