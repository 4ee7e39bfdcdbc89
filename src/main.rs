use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use todo_api::config::ServerConfig;
use todo_api::logging;

mod cmd;

#[derive(Parser)]
#[command(name = "todo-api")]
#[command(version, about = "HTTP back-end for activity groups and todo items")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "todo.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Enable dev mode (permissive CORS, bind on all interfaces)
        #[arg(long)]
        dev: bool,
    },
    /// Create the database file and schema without starting the server
    InitDb {
        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Print the resolved configuration as TOML
    Config,
}

/// Layer CLI flags over the file and environment configuration.
fn resolve_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = ServerConfig::load_or_default(&cli.config)?;
    config.apply_process_env()?;

    match &cli.command {
        Commands::Serve {
            port,
            host,
            db_path,
            dev,
        } => {
            if let Some(port) = port {
                config.port = *port;
            }
            if let Some(host) = host {
                config.host = host.clone();
            }
            if let Some(db_path) = db_path {
                config.db_path = db_path.clone();
            }
            if *dev {
                config.dev_mode = true;
            }
        }
        Commands::InitDb { db_path } => {
            if let Some(db_path) = db_path {
                config.db_path = db_path.clone();
            }
        }
        Commands::Config => {}
    }

    if cli.verbose {
        config.log_level = "debug".to_string();
    }

    config.ensure_valid()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    logging::init(&config.log_level, config.log_json)?;

    match &cli.command {
        Commands::Serve { .. } => cmd::cmd_serve(config).await?,
        Commands::InitDb { .. } => cmd::cmd_init_db(&config)?,
        Commands::Config => cmd::cmd_config(&cli.config, &config)?,
    }

    Ok(())
}
