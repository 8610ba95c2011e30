// src/commands/catalog.rs

//! Tag and ingredient CLI commands

use anyhow::{Context, Result};
use foodgram::Error;
use foodgram::repository::SqliteRepository;
use foodgram::service::catalog;
use serde::Deserialize;
use tracing::{info, warn};

/// Add a tag
pub fn cmd_tag_add(name: &str, color: &str, slug: &str, db_path: &str) -> Result<()> {
    let conn = foodgram::db::open(db_path)?;
    let repo = SqliteRepository::new(&conn);

    let tag = catalog::create_tag(&repo, name, color, slug)?;
    println!("Added tag '{}' (id={}, slug={}, color={})", tag.name, tag.id, tag.slug, tag.color);
    Ok(())
}

/// List all tags
pub fn cmd_tag_list(db_path: &str) -> Result<()> {
    let conn = foodgram::db::open(db_path)?;
    let tags = catalog::list_tags(&SqliteRepository::new(&conn))?;

    if tags.is_empty() {
        println!("No tags defined.");
        println!("\nUse 'foodgram tag add <name> <color> <slug>' to add one.");
        return Ok(());
    }

    println!("Tags ({}):", tags.len());
    for tag in &tags {
        println!("  [{}] {} ({}, {})", tag.id, tag.name, tag.slug, tag.color);
    }
    Ok(())
}

/// Add an ingredient
pub fn cmd_ingredient_add(name: &str, measurement_unit: &str, db_path: &str) -> Result<()> {
    let conn = foodgram::db::open(db_path)?;
    let repo = SqliteRepository::new(&conn);

    let ingredient = catalog::create_ingredient(&repo, name, measurement_unit)?;
    println!(
        "Added ingredient '{}' (id={}, unit={})",
        ingredient.name, ingredient.id, ingredient.measurement_unit
    );
    Ok(())
}

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

/// Load ingredients from a JSON array, skipping ones already present
pub fn cmd_ingredient_import(path: &str, db_path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ingredient file: {}", path))?;
    let records: Vec<IngredientRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse ingredient file: {}", path))?;

    let mut conn = foodgram::db::open(db_path)?;
    let (added, skipped) = foodgram::db::transaction(&mut conn, |tx| {
        let repo = SqliteRepository::new(tx);
        let mut added = 0usize;
        let mut skipped = 0usize;
        for record in &records {
            match catalog::create_ingredient(&repo, &record.name, &record.measurement_unit) {
                Ok(_) => added += 1,
                Err(Error::Conflict(_)) => skipped += 1,
                Err(e) => return Err(e),
            }
        }
        Ok((added, skipped))
    })?;

    if skipped > 0 {
        warn!("Skipped {} ingredients that already exist", skipped);
    }
    info!("Imported {} ingredients from {}", added, path);
    println!("Imported {} ingredients ({} already present)", added, skipped);
    Ok(())
}

/// List ingredients, optionally by name prefix
pub fn cmd_ingredient_list(prefix: Option<&str>, db_path: &str) -> Result<()> {
    let conn = foodgram::db::open(db_path)?;
    let ingredients = catalog::search_ingredients(&SqliteRepository::new(&conn), prefix)?;

    if ingredients.is_empty() {
        println!("No ingredients found.");
        return Ok(());
    }

    println!("Ingredients ({}):", ingredients.len());
    for ingredient in &ingredients {
        println!("  [{}] {}, {}", ingredient.id, ingredient.name, ingredient.measurement_unit);
    }
    Ok(())
}
