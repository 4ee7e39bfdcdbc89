//! Configuration view command — `todo-api config`.

use std::path::Path;

use anyhow::Result;

use todo_api::config::ServerConfig;

pub fn cmd_config(config_path: &Path, config: &ServerConfig) -> Result<()> {
    if config_path.exists() {
        println!("# Config file: {}", config_path.display());
    } else {
        println!("# Config file: {} (not found, using defaults)", config_path.display());
    }
    println!("{}", config.to_toml()?);
    Ok(())
}
