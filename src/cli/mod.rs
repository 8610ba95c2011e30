// src/cli/mod.rs
//! CLI definitions for the Foodgram backend
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `init` / `serve` - Database setup and the HTTP API
//! - `tag`, `ingredient` - Reference data managed by administrators
//! - `user` - Accounts, including staff accounts

use clap::{Parser, Subcommand};
use clap_complete::Shell;

mod catalog;
mod user;

pub use catalog::{IngredientCommands, TagCommands};
pub use user::UserCommands;

/// Default database location
pub const DEFAULT_DB_PATH: &str = "/var/lib/foodgram/foodgram.db";

#[derive(Parser)]
#[command(name = "foodgram")]
#[command(author = "Foodgram Contributors")]
#[command(version)]
#[command(about = "Recipe sharing backend with favorites, shopping lists and subscriptions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new Foodgram database
    Init {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },

    /// Run the HTTP API server
    #[cfg(feature = "server")]
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Address to bind to (host:port), overrides the config file
        #[arg(short, long)]
        bind: Option<String>,

        /// Path to the database file, overrides the config file
        #[arg(short, long)]
        db_path: Option<String>,

        /// Directory for uploaded images, overrides the config file
        #[arg(long)]
        media_root: Option<String>,
    },

    /// Manage recipe tags
    #[command(subcommand)]
    Tag(TagCommands),

    /// Manage ingredients
    #[command(subcommand)]
    Ingredient(IngredientCommands),

    /// Manage user accounts
    #[command(subcommand)]
    User(UserCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
