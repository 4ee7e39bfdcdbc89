//! Server and database commands — `todo-api serve`, `todo-api init-db`.

use anyhow::Result;
use tracing::info;

use todo_api::app::server;
use todo_api::config::ServerConfig;

pub async fn cmd_serve(config: ServerConfig) -> Result<()> {
    info!(
        host = %config.bind_host(),
        port = config.port,
        db_path = %config.db_path.display(),
        "Starting todo API"
    );
    server::start_server(config).await?;
    Ok(())
}

pub fn cmd_init_db(config: &ServerConfig) -> Result<()> {
    server::open_database(config)?;
    println!("Database initialized at {}", config.db_path.display());
    Ok(())
}
