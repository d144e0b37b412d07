use codealong::config::Config;
use codealong::http::{AppState, HttpServer, HttpServerConfig};
use codealong::seed::seed_database;
use codealong::sqlite::Sqlite;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let store = Sqlite::new(config.database_url()).await?;

    if config.reset_database() {
        if let Err(err) = seed_database(&store).await {
            tracing::error!(error = ?err, "Failed to seed database");
        }
    }

    let state = AppState::new(store);
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
