// src/commands/mod.rs
//! Command handlers for the Foodgram CLI

mod catalog;
mod system;
mod user;

pub use catalog::{
    cmd_ingredient_add, cmd_ingredient_import, cmd_ingredient_list, cmd_tag_add, cmd_tag_list,
};
#[cfg(feature = "server")]
pub use system::cmd_serve;
pub use system::{cmd_completions, cmd_init};
pub use user::{cmd_user_create, cmd_user_list};
