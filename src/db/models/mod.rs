// src/db/models/mod.rs

//! Data models for Foodgram database entities
//!
//! This module defines Rust structs that correspond to database tables
//! and provides methods for creating, reading, updating, and deleting records.

mod auth_token;
mod ingredient;
mod recipe;
mod recipe_ingredient;
mod recipe_list;
mod recipe_tag;
mod subscription;
mod tag;
mod user;

pub use auth_token::AuthToken;
pub use ingredient::Ingredient;
pub use recipe::{Recipe, RecipeFilter, RecipeRow};
pub use recipe_ingredient::{IngredientAmount, MAX_AMOUNT, MIN_AMOUNT, RecipeIngredient};
pub use recipe_list::{RecipeList, ShoppingListItem};
pub use recipe_tag::RecipeTag;
pub use subscription::Subscription;
pub use tag::Tag;
pub use user::User;

/// Case-folded form of a name, stored in `name_search` columns
pub(crate) fn search_key(name: &str) -> String {
    name.to_lowercase()
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use crate::error::Error;
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        schema::migrate(&conn).unwrap();
        (temp_file, conn)
    }

    fn create_user(conn: &Connection, username: &str) -> i64 {
        let mut user = User::new(
            format!("{}@example.com", username),
            username.to_string(),
            "First".to_string(),
            "Last".to_string(),
            "hash".to_string(),
        );
        user.insert(conn).unwrap()
    }

    fn create_recipe(conn: &Connection, author_id: i64, name: &str) -> i64 {
        let mut recipe = Recipe::new(
            author_id,
            name.to_string(),
            format!("How to make {}", name),
            "recipes/images/x.png".to_string(),
            10,
        );
        recipe.insert(conn).unwrap()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_user_crud() {
        let (_temp, conn) = create_test_db();

        let id = create_user(&conn, "alice");
        assert!(id > 0);

        let found = User::find_by_email(&conn, "alice@example.com").unwrap().unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.username, "alice");
        assert!(!found.is_staff);
        assert!(found.date_joined.is_some());

        User::set_staff(&conn, id, true).unwrap();
        assert!(User::find_by_id(&conn, id).unwrap().unwrap().is_staff);

        User::update_password(&conn, id, "new-hash").unwrap();
        let found = User::find_by_username(&conn, "alice").unwrap().unwrap();
        assert_eq!(found.password_hash, "new-hash");

        assert_eq!(User::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_user_is_conflict() {
        let (_temp, conn) = create_test_db();
        create_user(&conn, "alice");

        let mut dup = User::new(
            "alice@example.com".to_string(),
            "other".to_string(),
            "A".to_string(),
            "B".to_string(),
            "hash".to_string(),
        );
        assert!(matches!(dup.insert(&conn), Err(Error::Conflict(_))));
    }

    #[test]
    fn test_tag_and_ingredient_uniqueness() {
        let (_temp, conn) = create_test_db();

        let mut tag = Tag::new("Breakfast".into(), "#E26C2D".into(), "breakfast".into());
        tag.insert(&conn).unwrap();
        let mut same_color = Tag::new("Lunch".into(), "#E26C2D".into(), "lunch".into());
        assert!(matches!(same_color.insert(&conn), Err(Error::Conflict(_))));

        let mut milk_ml = Ingredient::new("milk".into(), "ml".into());
        milk_ml.insert(&conn).unwrap();
        let mut milk_g = Ingredient::new("milk".into(), "g".into());
        milk_g.insert(&conn).unwrap();
        let mut dup = Ingredient::new("milk".into(), "ml".into());
        assert!(matches!(dup.insert(&conn), Err(Error::Conflict(_))));
    }

    #[test]
    fn test_ingredient_prefix_search() {
        let (_temp, conn) = create_test_db();
        for (name, unit) in [("Sugar", "g"), ("salt", "g"), ("Sour cream", "g"), ("flour", "g")] {
            Ingredient::new(name.into(), unit.into()).insert(&conn).unwrap();
        }

        let found = Ingredient::search_prefix(&conn, "s").unwrap();
        let names: Vec<&str> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["salt", "Sour cream", "Sugar"]);

        let found = Ingredient::search_prefix(&conn, "su").unwrap();
        assert_eq!(found.len(), 1);

        assert_eq!(Ingredient::search_prefix(&conn, "").unwrap().len(), 4);
        assert!(Ingredient::search_prefix(&conn, "%").unwrap().is_empty());
    }

    #[test]
    fn test_ingredient_search_folds_cyrillic() {
        let (_temp, conn) = create_test_db();
        for (name, unit) in [("Сахар", "г"), ("сало", "г"), ("Соль", "г")] {
            Ingredient::new(name.into(), unit.into()).insert(&conn).unwrap();
        }

        let found = Ingredient::search_prefix(&conn, "са").unwrap();
        let names: Vec<&str> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["сало", "Сахар"]);

        assert_eq!(Ingredient::search_prefix(&conn, "СОЛ").unwrap().len(), 1);
    }

    #[test]
    fn test_recipe_search_folds_cyrillic() {
        let (_temp, conn) = create_test_db();
        let author = create_user(&conn, "cook");
        let borsch = create_recipe(&conn, author, "Борщ украинский");
        create_recipe(&conn, author, "Pancakes");

        let search = |term: &str| {
            let filter = RecipeFilter {
                search: Some(term.to_string()),
                ..Default::default()
            };
            Recipe::query(&conn, &filter, None, 10, 0)
                .unwrap()
                .into_iter()
                .map(|row| row.recipe.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(search("УКРАИН"), vec!["Борщ украинский"]);
        assert_eq!(search("борщ"), vec!["Борщ украинский"]);
        assert_eq!(search("PANCAKE"), vec!["Pancakes"]);

        let mut recipe = Recipe::find_by_id(&conn, borsch).unwrap().unwrap();
        recipe.name = "Щи".to_string();
        recipe.update(&conn).unwrap();
        assert!(search("борщ").is_empty());
        assert_eq!(search("щи"), vec!["Щи"]);
    }

    #[test]
    fn test_recipe_ingredient_replace() {
        let (_temp, conn) = create_test_db();
        let author = create_user(&conn, "cook");
        let recipe = create_recipe(&conn, author, "Pancakes");

        let ids: Vec<i64> = ["a", "b", "c"]
            .iter()
            .map(|n| Ingredient::new(n.to_string(), "g".into()).insert(&conn).unwrap())
            .collect();

        RecipeIngredient::replace_for_recipe(&conn, recipe, &[(ids[0], 100), (ids[1], 50)]).unwrap();
        RecipeIngredient::replace_for_recipe(&conn, recipe, &[(ids[1], 75), (ids[2], 10)]).unwrap();

        let items = RecipeIngredient::list_for_recipe(&conn, recipe).unwrap();
        let pairs: Vec<(&str, i64)> = items.iter().map(|i| (i.name.as_str(), i.amount)).collect();
        assert_eq!(pairs, vec![("b", 75), ("c", 10)]);
    }

    #[test]
    fn test_amount_check_constraint() {
        let (_temp, conn) = create_test_db();
        let author = create_user(&conn, "cook");
        let recipe = create_recipe(&conn, author, "Bread");
        let flour = Ingredient::new("flour".into(), "g".into()).insert(&conn).unwrap();

        assert!(RecipeIngredient::new(recipe, flour, MAX_AMOUNT + 1).upsert(&conn).is_err());
        assert!(RecipeIngredient::new(recipe, flour, MAX_AMOUNT).upsert(&conn).is_ok());
    }

    #[test]
    fn test_recipe_list_membership() {
        let (_temp, conn) = create_test_db();
        let user = create_user(&conn, "eater");
        let recipe = create_recipe(&conn, user, "Soup");

        RecipeList::Favorites.add(&conn, user, recipe).unwrap();
        let row = Recipe::find_row(&conn, recipe, Some(user)).unwrap().unwrap();
        assert!(row.is_favorited);
        assert!(!row.is_in_shopping_cart);

        assert!(matches!(
            RecipeList::Favorites.add(&conn, user, recipe),
            Err(Error::Conflict(_))
        ));

        assert!(RecipeList::Favorites.remove(&conn, user, recipe).unwrap());
        assert!(!RecipeList::Favorites.remove(&conn, user, recipe).unwrap());
    }

    #[test]
    fn test_recipe_delete_cascades() {
        let (_temp, conn) = create_test_db();
        let user = create_user(&conn, "cook");
        let recipe = create_recipe(&conn, user, "Stew");
        let mut tag = Tag::new("Dinner".into(), "#8775D2".into(), "dinner".into());
        let tag_id = tag.insert(&conn).unwrap();
        let carrot = Ingredient::new("carrot".into(), "pcs".into()).insert(&conn).unwrap();

        RecipeTag::insert(&conn, recipe, tag_id).unwrap();
        RecipeIngredient::new(recipe, carrot, 2).upsert(&conn).unwrap();
        RecipeList::Favorites.add(&conn, user, recipe).unwrap();
        RecipeList::ShoppingCart.add(&conn, user, recipe).unwrap();

        assert!(Recipe::delete(&conn, recipe).unwrap());

        for table in ["recipe_tags", "recipe_ingredients", "favorite_recipes", "shopping_cart_recipes"] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0, "{} not cleaned up", table);
        }
    }

    #[test]
    fn test_shopping_list_sums_amounts() {
        let (_temp, conn) = create_test_db();
        let user = create_user(&conn, "cook");
        let flour = Ingredient::new("Flour".into(), "g".into()).insert(&conn).unwrap();
        let eggs = Ingredient::new("Eggs".into(), "pcs".into()).insert(&conn).unwrap();

        let a = create_recipe(&conn, user, "A");
        let b = create_recipe(&conn, user, "B");
        let c = create_recipe(&conn, user, "C");
        RecipeIngredient::new(a, flour, 200).upsert(&conn).unwrap();
        RecipeIngredient::new(a, eggs, 2).upsert(&conn).unwrap();
        RecipeIngredient::new(b, flour, 300).upsert(&conn).unwrap();
        RecipeIngredient::new(c, flour, 1000).upsert(&conn).unwrap();

        RecipeList::ShoppingCart.add(&conn, user, a).unwrap();
        RecipeList::ShoppingCart.add(&conn, user, b).unwrap();

        let items = ShoppingListItem::for_user(&conn, user).unwrap();
        assert_eq!(
            items,
            vec![
                ShoppingListItem {
                    name: "Eggs".into(),
                    measurement_unit: "pcs".into(),
                    total_amount: 2
                },
                ShoppingListItem {
                    name: "Flour".into(),
                    measurement_unit: "g".into(),
                    total_amount: 500
                },
            ]
        );
    }

    #[test]
    fn test_subscription_rules() {
        let (_temp, conn) = create_test_db();
        let reader = create_user(&conn, "reader");
        let author = create_user(&conn, "author");

        Subscription::insert(&conn, reader, author).unwrap();
        assert!(Subscription::exists(&conn, reader, author).unwrap());
        assert!(matches!(
            Subscription::insert(&conn, reader, author),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            Subscription::insert(&conn, reader, reader),
            Err(Error::Conflict(_))
        ));

        let authors = Subscription::list_authors(&conn, reader, 10, 0).unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].username, "author");
        assert_eq!(Subscription::count_authors(&conn, reader).unwrap(), 1);

        assert!(Subscription::delete(&conn, reader, author).unwrap());
        assert!(!Subscription::delete(&conn, reader, author).unwrap());
    }
}
