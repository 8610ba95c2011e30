// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: database path
fn db_path_arg() -> Arg {
    Arg::new("db_path")
        .short('d')
        .long("db-path")
        .value_name("PATH")
        .default_value("/var/lib/foodgram/foodgram.db")
        .help("Database path")
}

fn text_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(long).required(true).help(help)
}

fn build_cli() -> Command {
    Command::new("foodgram")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Foodgram Contributors")
        .about("Recipe sharing backend with favorites, shopping lists and subscriptions")
        .subcommand_required(false)
        .subcommand(
            Command::new("init")
                .about("Initialize the Foodgram database")
                .arg(db_path_arg()),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API server")
                .arg(Arg::new("config").short('c').long("config").help("TOML configuration file"))
                .arg(Arg::new("bind").short('b').long("bind").help("Address to bind to (host:port)"))
                .arg(Arg::new("db_path").short('d').long("db-path").help("Database path"))
                .arg(Arg::new("media_root").long("media-root").help("Directory for uploaded images")),
        )
        .subcommand(
            Command::new("tag")
                .about("Manage recipe tags")
                .subcommand(
                    Command::new("add")
                        .about("Add a tag")
                        .arg(Arg::new("name").required(true).help("Display name"))
                        .arg(Arg::new("color").required(true).help("Color as #RRGGBB"))
                        .arg(Arg::new("slug").required(true).help("URL slug"))
                        .arg(db_path_arg()),
                )
                .subcommand(Command::new("list").about("List tags").arg(db_path_arg())),
        )
        .subcommand(
            Command::new("ingredient")
                .about("Manage ingredients")
                .subcommand(
                    Command::new("add")
                        .about("Add an ingredient")
                        .arg(Arg::new("name").required(true).help("Ingredient name"))
                        .arg(Arg::new("measurement_unit").required(true).help("Measurement unit"))
                        .arg(db_path_arg()),
                )
                .subcommand(
                    Command::new("import")
                        .about("Import ingredients from a JSON file")
                        .arg(Arg::new("path").required(true).help("Path to the JSON file"))
                        .arg(db_path_arg()),
                )
                .subcommand(
                    Command::new("list")
                        .about("List ingredients")
                        .arg(Arg::new("name").short('n').long("name").help("Name prefix"))
                        .arg(db_path_arg()),
                ),
        )
        .subcommand(
            Command::new("user")
                .about("Manage user accounts")
                .subcommand(
                    Command::new("create")
                        .about("Create a user account")
                        .arg(text_arg("email", "email", "Email address"))
                        .arg(text_arg("username", "username", "Login name"))
                        .arg(text_arg("first_name", "first-name", "First name"))
                        .arg(text_arg("last_name", "last-name", "Last name"))
                        .arg(text_arg("password", "password", "Password"))
                        .arg(
                            Arg::new("staff")
                                .long("staff")
                                .action(clap::ArgAction::SetTrue)
                                .help("Grant staff rights"),
                        )
                        .arg(db_path_arg()),
                )
                .subcommand(Command::new("list").about("List user accounts").arg(db_path_arg())),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("foodgram.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
