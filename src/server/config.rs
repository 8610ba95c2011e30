// src/server/config.rs
//! Configuration file parsing for the Foodgram server
//!
//! Supports TOML configuration files with the following sections:
//! - [server] - Bind address, CORS origins
//! - [storage] - Database path, media directory and public media URL
//! - [pagination] - Default and maximum page sizes

use crate::pagination::PaginationConfig;
use crate::server::ServerConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct FoodgramConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Server configuration section
#[derive(Debug, Deserialize)]
pub struct ServerSection {
    /// API bind address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Origins allowed to call the API from a browser (empty = any)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

/// Storage configuration section
#[derive(Debug, Deserialize)]
pub struct StorageSection {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory holding uploaded images
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// URL prefix under which media files are served
    #[serde(default = "default_media_url")]
    pub media_url: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            media_root: default_media_root(),
            media_url: default_media_url(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/var/lib/foodgram/foodgram.db")
}

fn default_media_root() -> PathBuf {
    PathBuf::from("/var/lib/foodgram/media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

impl FoodgramConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind))?;

        if self.pagination.page_size < 1 {
            anyhow::bail!("pagination.page_size must be at least 1");
        }
        if self.pagination.max_page_size < self.pagination.page_size {
            anyhow::bail!("pagination.max_page_size must not be smaller than page_size");
        }

        let media_url = &self.storage.media_url;
        if !media_url.starts_with('/') || media_url.trim_end_matches('/').is_empty() {
            anyhow::bail!("storage.media_url must be an absolute path such as /media");
        }
        if media_url.starts_with("/api") {
            anyhow::bail!("storage.media_url must not live under /api");
        }

        Ok(())
    }

    /// Convert to the runtime server configuration
    pub fn to_server_config(&self) -> Result<ServerConfig> {
        let bind_addr = self
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind))?;

        Ok(ServerConfig {
            bind_addr,
            db_path: self.storage.db_path.clone(),
            media_root: self.storage.media_root.clone(),
            media_url: self.storage.media_url.trim_end_matches('/').to_string(),
            cors_allowed_origins: self.server.cors_origins.clone(),
            pagination: self.pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FoodgramConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.pagination.page_size, 6);
        assert_eq!(config.pagination.max_page_size, 10);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
bind = "127.0.0.1:9000"
cors_origins = ["http://localhost:3000"]

[storage]
db_path = "/srv/foodgram/db.sqlite"
media_root = "/srv/foodgram/media"
media_url = "/media/"

[pagination]
page_size = 8
"#;

        let config = FoodgramConfig::parse(toml_str).unwrap();
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.pagination.page_size, 8);
        assert_eq!(config.pagination.max_page_size, 10);

        let server = config.to_server_config().unwrap();
        assert_eq!(server.bind_addr.port(), 9000);
        assert_eq!(server.db_path, PathBuf::from("/srv/foodgram/db.sqlite"));
        assert_eq!(server.media_url, "/media");
    }

    #[test]
    fn test_invalid_values() {
        assert!(FoodgramConfig::parse("[server]\nbind = \"nowhere\"").is_err());
        assert!(FoodgramConfig::parse("[pagination]\npage_size = 0").is_err());
        assert!(FoodgramConfig::parse("[pagination]\npage_size = 20").is_err());
        assert!(FoodgramConfig::parse("[storage]\nmedia_url = \"media\"").is_err());
        assert!(FoodgramConfig::parse("[storage]\nmedia_url = \"/api/media\"").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = FoodgramConfig::load(Path::new("/nonexistent/foodgram.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
