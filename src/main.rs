use tracing_subscriber::EnvFilter;

use telecare::api::server::start_server;
use telecare::config;
use telecare::db::sqlite::open_database;
use telecare::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let db_path = config::database_path();
    // Open once up front so migration failures abort startup
    open_database(&db_path)?;

    let state = AppState::new(db_path);
    let mut server = start_server(state, config::bind_addr()).await?;
    tracing::info!(addr = %server.addr, "listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    server.shutdown();

    Ok(())
}
