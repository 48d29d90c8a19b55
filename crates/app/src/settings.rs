//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml`, then from `MINIAPP__*` environment variables
//! (e.g. `MINIAPP__SERVER__PORT=9000`).
//!
//! See `settings.example.toml` for the configuration.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Tracing level for the workspace crates.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 8000,
            database: Database::Memory,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Media {
    pub root: String,
}

impl Default for Media {
    fn default() -> Self {
        Self {
            root: "media".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub media: Media,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS)).required(path.is_some()))
            .add_source(
                Environment::with_prefix("MINIAPP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.bind, None);
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.media.root, "media");
    }

    #[test]
    fn sqlite_database_is_read() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 9000

            [server.database]
            sqlite = "miniapp.db"

            [media]
            root = "/srv/media"
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.server.port, 9000);
        assert_eq!(
            settings.server.database,
            Database::Sqlite("miniapp.db".to_string())
        );
        assert_eq!(settings.media.root, "/srv/media");
    }

    #[test]
    fn memory_database_is_a_plain_string() {
        let settings = parse(
            r#"
            [server]
            database = "memory"
            "#,
        );
        assert_eq!(settings.server.database, Database::Memory);
    }
}
