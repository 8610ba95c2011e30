// src/main.rs

use anyhow::Result;
use clap::Parser;
use foodgram::service::users::UserCreate;

mod cli;
mod commands;

use cli::{Cli, Commands, IngredientCommands, TagCommands, UserCommands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { db_path }) => commands::cmd_init(&db_path),

        #[cfg(feature = "server")]
        Some(Commands::Serve {
            config,
            bind,
            db_path,
            media_root,
        }) => commands::cmd_serve(
            config.as_deref(),
            bind.as_deref(),
            db_path.as_deref(),
            media_root.as_deref(),
        ),

        Some(Commands::Tag(command)) => match command {
            TagCommands::Add {
                name,
                color,
                slug,
                db_path,
            } => commands::cmd_tag_add(&name, &color, &slug, &db_path),
            TagCommands::List { db_path } => commands::cmd_tag_list(&db_path),
        },

        Some(Commands::Ingredient(command)) => match command {
            IngredientCommands::Add {
                name,
                measurement_unit,
                db_path,
            } => commands::cmd_ingredient_add(&name, &measurement_unit, &db_path),
            IngredientCommands::Import { path, db_path } => {
                commands::cmd_ingredient_import(&path, &db_path)
            }
            IngredientCommands::List { name, db_path } => {
                commands::cmd_ingredient_list(name.as_deref(), &db_path)
            }
        },

        Some(Commands::User(command)) => match command {
            UserCommands::Create {
                email,
                username,
                first_name,
                last_name,
                password,
                staff,
                db_path,
            } => commands::cmd_user_create(
                UserCreate {
                    email,
                    username,
                    first_name,
                    last_name,
                    password,
                },
                staff,
                &db_path,
            ),
            UserCommands::List { db_path } => commands::cmd_user_list(&db_path),
        },

        Some(Commands::Completions { shell }) => commands::cmd_completions(shell),

        None => {
            // No command provided, show help
            println!("Foodgram v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'foodgram --help' for usage information");
            Ok(())
        }
    }
}
