// src/cli/catalog.rs
//! Tag and ingredient commands

use super::DEFAULT_DB_PATH;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum TagCommands {
    /// Add a tag
    Add {
        /// Display name
        name: String,

        /// Color as #RRGGBB
        color: String,

        /// URL slug (letters, digits, hyphens, underscores)
        slug: String,

        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },

    /// List tags
    List {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },
}

#[derive(Subcommand)]
pub enum IngredientCommands {
    /// Add an ingredient
    Add {
        /// Ingredient name
        name: String,

        /// Measurement unit (g, ml, pcs, ...)
        measurement_unit: String,

        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },

    /// Import ingredients from a JSON file
    ///
    /// The file holds an array of `{"name": ..., "measurement_unit": ...}`
    /// objects. Entries that already exist are skipped.
    Import {
        /// Path to the JSON file
        path: String,

        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },

    /// List ingredients
    List {
        /// Only names starting with this prefix
        #[arg(short, long)]
        name: Option<String>,

        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },
}
