//! Application settings.
//!
//! Read from `config/shopops.toml` (optional) and overridden by
//! `SHOPOPS__*` environment variables, e.g. `SHOPOPS__SERVER__PORT=9000`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Deserialize)]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("config/shopops").required(false))
                .add_source(Environment::with_prefix("SHOPOPS").separator("__"))
                .build()?,
        )
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Settings {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        Settings::from_config(config).unwrap()
    }

    #[test]
    fn empty_config_has_no_server() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
    }

    #[test]
    fn sqlite_server_section() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 9000
            database = { Sqlite = "shopops.db" }
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 9000);
        assert!(server.bind.is_none());
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "shopops.db"));
    }

    #[test]
    fn memory_database_and_default_port() {
        let settings = parse(
            r#"
            [server]
            database = "Memory"
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8000);
        assert!(matches!(server.database, Database::Memory));
    }
}
