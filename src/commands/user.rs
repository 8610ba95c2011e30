// src/commands/user.rs

//! User account CLI commands

use anyhow::Result;
use foodgram::db::models::User;
use foodgram::repository::{SqliteRepository, UserRepository};
use foodgram::service::users::{self, UserCreate};
use tracing::info;

/// Create an account, optionally with staff rights
///
/// Registration and the staff grant commit together.
pub fn cmd_user_create(input: UserCreate, staff: bool, db_path: &str) -> Result<()> {
    let mut conn = foodgram::db::open(db_path)?;
    let user = foodgram::db::transaction(&mut conn, |tx| {
        let user = users::register(&SqliteRepository::new(tx), input)?;
        if staff {
            User::set_staff(tx, user.id, true)?;
            info!("Granted staff rights to {}", user.username);
        }
        Ok(user)
    })?;

    println!(
        "Created {}user '{}' (id={}, email={})",
        if staff { "staff " } else { "" },
        user.username,
        user.id,
        user.email
    );
    Ok(())
}

/// List every account
pub fn cmd_user_list(db_path: &str) -> Result<()> {
    let conn = foodgram::db::open(db_path)?;
    let repo = SqliteRepository::new(&conn);

    let count = repo.count_users()?;
    if count == 0 {
        println!("No users registered.");
        return Ok(());
    }

    println!("Users ({}):", count);
    for user in repo.list_users(count, 0)? {
        println!(
            "  [{}] {} <{}> {} {}{}",
            user.id.unwrap_or(0),
            user.username,
            user.email,
            user.first_name,
            user.last_name,
            if user.is_staff { " (staff)" } else { "" }
        );
    }
    Ok(())
}
