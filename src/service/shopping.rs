// src/service/shopping.rs

//! Shopping-list aggregation and its plain-text rendering

use crate::auth::Viewer;
use crate::db::models::ShoppingListItem;
use crate::error::Result;
use crate::repository::Repository;
use std::fmt::Write;

/// File name offered for the downloaded list
pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

/// Ingredient totals over every recipe in the viewer's cart
///
/// Recomputed on each call, grouped by ingredient and ordered by name.
pub fn shopping_list<R: Repository + ?Sized>(
    repo: &R,
    viewer: &Viewer,
) -> Result<Vec<ShoppingListItem>> {
    let user_id = viewer.require_id()?;
    repo.shopping_list(user_id)
}

/// Numbered listing, one `N. name - total, unit` line per ingredient
pub fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - {}, {}",
            index + 1,
            item.name,
            item.total_amount,
            item.measurement_unit
        );
    }
    out
}
