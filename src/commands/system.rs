// src/commands/system.rs
//! Database setup, shell completions and the API server

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;
use tracing::info;

use crate::cli::Cli;

/// Create the database and apply migrations
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing Foodgram database at: {}", db_path);
    foodgram::db::init(db_path)?;
    println!("Database initialized successfully at: {}", db_path);
    Ok(())
}

/// Print a completion script for `shell` to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "foodgram", &mut std::io::stdout());
    Ok(())
}

/// Run the API server until interrupted
///
/// Values come from the config file (or defaults); flags override them.
#[cfg(feature = "server")]
pub fn cmd_serve(
    config_path: Option<&str>,
    bind: Option<&str>,
    db_path: Option<&str>,
    media_root: Option<&str>,
) -> Result<()> {
    use anyhow::Context;
    use foodgram::server::{FoodgramConfig, run_server};
    use std::path::{Path, PathBuf};

    let file_config = match config_path {
        Some(path) => FoodgramConfig::load(Path::new(path))?,
        None => FoodgramConfig::default(),
    };
    let mut config = file_config.to_server_config()?;

    if let Some(bind) = bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", bind))?;
    }
    if let Some(db_path) = db_path {
        config.db_path = PathBuf::from(db_path);
    }
    if let Some(media_root) = media_root {
        config.media_root = PathBuf::from(media_root);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run_server(config))
}
