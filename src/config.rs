//! Layered configuration: YAML files, then `TRIPLEDGER__*` environment
//! variables. Command-line flags are applied on top by the binary.

use crate::application::service::{DEFAULT_BUS_CAPACITY, DEFAULT_TRIP_TITLE};
use crate::domain::access::{UserAccount, UserDirectory};
use crate::error::Result;
use crate::infrastructure::cached::DEFAULT_TTL;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tripledger.yaml";
/// Environment variable holding an extra configuration file path.
pub const CONFIG_ENV_VAR: &str = "TRIPLEDGER_CONFIG";
/// Prefix of environment overrides, e.g. `TRIPLEDGER__STORAGE__TYPE=sheets`.
pub const CONFIG_ENV_PREFIX: &str = "TRIPLEDGER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Single local JSON document.
    #[default]
    Json,
    /// Customer, payment and configuration tables.
    Sheets,
    /// Embedded RocksDB (needs the `storage-rocksdb` feature).
    Rocksdb,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JsonStorageConfig {
    pub path: PathBuf,
}

impl Default for JsonStorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("viaje_data.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsStorageConfig {
    /// Directory holding one CSV file per table.
    pub dir: PathBuf,
    /// How long full listings are served from memory. Zero disables caching.
    pub cache_ttl_secs: u64,
}

impl Default for SheetsStorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("viaje_san_juan_data"),
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl SheetsStorageConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RocksDbStorageConfig {
    pub path: PathBuf,
}

impl Default for RocksDbStorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("viaje_db"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    pub json: JsonStorageConfig,
    pub sheets: SheetsStorageConfig,
    pub rocksdb: RocksDbStorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// When false every command runs as a local administrator.
    pub enabled: bool,
    /// Replaces the built-in accounts when not empty.
    pub users: BTreeMap<String, UserAccount>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            users: BTreeMap::new(),
        }
    }
}

impl AuthConfig {
    pub fn uses_default_users(&self) -> bool {
        self.users.is_empty()
    }

    pub fn directory(&self) -> UserDirectory {
        if self.users.is_empty() {
            UserDirectory::default()
        } else {
            UserDirectory::new(self.users.clone())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TripConfig {
    pub title: String,
    pub bus_capacity: u32,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TRIP_TITLE.to_string(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub trip: TripConfig,
}

impl AppConfig {
    /// Load configuration from files and environment.
    ///
    /// Sources, later overriding earlier:
    /// 1. `tripledger.yaml` in the working directory (if it exists)
    /// 2. `path`, when given
    /// 3. the file named by `TRIPLEDGER_CONFIG`, when set
    /// 4. `TRIPLEDGER__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::from(config_path).format(FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::{Role, hash_password};
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.storage_type, StorageType::Json);
        assert_eq!(config.storage.sheets.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.trip.bus_capacity, 50);
        assert!(config.auth.enabled);
        assert!(config.auth.uses_default_users());
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trip.yaml");
        let yaml = format!(
            r#"
storage:
  type: sheets
  sheets:
    dir: /tmp/tablas
    cache_ttl_secs: 5
auth:
  users:
    lupita:
      password_hash: "{}"
      display_name: Lupita
      role: viewer
trip:
  bus_capacity: 45
"#,
            hash_password("secreto")
        );
        std::fs::write(&path, yaml).unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.storage.storage_type, StorageType::Sheets);
        assert_eq!(config.storage.sheets.dir, PathBuf::from("/tmp/tablas"));
        assert_eq!(config.storage.sheets.cache_ttl_secs, 5);
        assert_eq!(config.storage.json.path, PathBuf::from("viaje_data.json"));
        assert_eq!(config.trip.bus_capacity, 45);
        assert_eq!(config.trip.title, DEFAULT_TRIP_TITLE);

        let session = config.auth.directory().verify("lupita", "secreto").unwrap();
        assert_eq!(session.role, Role::Viewer);
        assert!(config.auth.directory().verify("admin", "admin").is_err());
    }

    #[test]
    fn test_mixed_case_username_logs_in() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trip.yaml");
        let yaml = format!(
            "auth:\n  users:\n    Lupita:\n      password_hash: \"{}\"\n      display_name: Lupita\n      role: staff\n",
            hash_password("secreto")
        );
        std::fs::write(&path, yaml).unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        let directory = config.auth.directory();
        assert_eq!(directory.verify("Lupita", "secreto").unwrap().role, Role::Staff);
        assert!(directory.verify("lupita", "secreto").is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("nope.yaml"))).is_err());
    }
}
