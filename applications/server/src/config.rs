/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_sync")]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Channel sync worker tasks
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ServerConfig {
    /// Load configuration from file and environment.
    ///
    /// `path` overrides the default `config.toml` in the working directory;
    /// an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("config.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (prefixed with VIDSHELF_)
        settings = settings.add_source(
            config::Environment::with_prefix("VIDSHELF")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(ServerError::Config(
                "database URL is required (set VIDSHELF_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ServerError::Config("port must not be 0".to_string()));
        }

        if self.storage.max_connections == 0 {
            return Err(ServerError::Config(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }

        if self.sync.workers == 0 {
            return Err(ServerError::Config(
                "sync.workers must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        max_connections: default_max_connections(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/vidshelf.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_sync() -> SyncSettings {
    SyncSettings {
        workers: default_workers(),
    }
}

fn default_workers() -> usize {
    1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            sync: default_sync(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.max_connections, 5);
        assert_eq!(config.sync.workers, 1);
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.storage.database_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.storage.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.sync.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vidshelf.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[storage]\ndatabase_url = \"sqlite://custom.db\"\n"
        )
        .unwrap();

        let config = ServerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.database_url, "sqlite://custom.db");
        assert_eq!(config.sync.workers, 1);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let err = ServerConfig::load(Some(Path::new("/nonexistent/vidshelf.toml"))).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
